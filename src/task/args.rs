//! Generator argument list
//!
//! JFlex parses its command line positionally: options first, grammar last.

use std::ffi::OsString;
use std::path::Path;

/// Flag introducing the output directory
pub const OUTPUT_DIR_FLAG: &str = "-d";

/// Flag introducing the skeleton file
pub const SKELETON_FLAG: &str = "--skel";

/// `-d <output_dir> [--skel <skeleton>] <source>`
pub fn build_arguments(output_dir: &Path, skeleton: Option<&Path>, source: &Path) -> Vec<OsString> {
    let mut args = Vec::with_capacity(5);
    args.push(OsString::from(OUTPUT_DIR_FLAG));
    args.push(output_dir.as_os_str().to_owned());
    if let Some(skeleton) = skeleton {
        args.push(OsString::from(SKELETON_FLAG));
        args.push(skeleton.as_os_str().to_owned());
    }
    args.push(source.as_os_str().to_owned());
    args
}
