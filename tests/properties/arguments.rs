//! Property tests for generator argument layout.

use std::ffi::OsString;
use std::path::PathBuf;

use proptest::prelude::*;

use flexgen::task::args::{build_arguments, OUTPUT_DIR_FLAG, SKELETON_FLAG};

fn path() -> impl Strategy<Value = PathBuf> {
    proptest::collection::vec("[A-Za-z0-9 ._-]{1,12}", 1..=4)
        .prop_map(|segments| PathBuf::from(segments.join("/")))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `-d <dir>` leads, the source is last, and `--skel <file>`
    /// appears exactly when a skeleton is set.
    #[test]
    fn property_argument_order(
        out in path(),
        skeleton in proptest::option::of(path()),
        source in path(),
    ) {
        let args = build_arguments(&out, skeleton.as_deref(), &source);

        prop_assert_eq!(&args[0], &OsString::from(OUTPUT_DIR_FLAG));
        prop_assert_eq!(&args[1], &OsString::from(out.as_os_str()));
        prop_assert_eq!(args.last(), Some(&OsString::from(source.as_os_str())));

        let skel_flags = args
            .iter()
            .filter(|a| a.as_os_str() == SKELETON_FLAG)
            .count();
        match &skeleton {
            Some(skel) => {
                prop_assert_eq!(args.len(), 5);
                prop_assert_eq!(skel_flags, 1);
                prop_assert_eq!(&args[2], &OsString::from(SKELETON_FLAG));
                prop_assert_eq!(&args[3], &OsString::from(skel.as_os_str()));
            }
            None => {
                prop_assert_eq!(args.len(), 3);
                prop_assert_eq!(skel_flags, 0);
            }
        }
    }
}
