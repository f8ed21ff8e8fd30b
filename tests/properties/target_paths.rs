//! Property tests for target file derivation.

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use flexgen::task::paths::{target_file, target_output_dir, validate_target_class};
use flexgen::task::OUTPUT_EXTENSION;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-]{1,12}").unwrap()
}

fn relative_dir() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..=4).prop_map(|segments| segments.join("/"))
}

fn class_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z_$][A-Za-z0-9_$]{0,24}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the target file is `<output dir>/<class>.java`.
    #[test]
    #[cfg(unix)]
    fn property_target_file_layout(dir in relative_dir(), class in class_name()) {
        let project = PathBuf::from("/work/plugin");
        let out = target_output_dir(&project, Some(Path::new(&dir)), None).unwrap();
        let file = target_file(&out, &class);

        prop_assert_eq!(
            file.to_string_lossy().into_owned(),
            format!("/work/plugin/{}/{}.{}", dir, class, OUTPUT_EXTENSION)
        );
        prop_assert_eq!(file.parent(), Some(out.as_path()));
    }

    /// PROPERTY: an explicit output directory always wins over the target dir.
    #[test]
    fn property_output_dir_override_wins(dir in relative_dir(), other in relative_dir()) {
        let project = PathBuf::from("project");
        let out = target_output_dir(&project, Some(Path::new(&dir)), Some(Path::new(&other))).unwrap();
        prop_assert_eq!(out, project.join(&other));
    }

    /// PROPERTY: class names never escape the output directory.
    #[test]
    fn property_class_names_with_separators_rejected(
        prefix in class_name(),
        suffix in class_name(),
    ) {
        let name = format!("{}/{}", prefix, suffix);
        prop_assert!(validate_target_class(&name).is_err());
        prop_assert!(validate_target_class(&prefix).is_ok());
    }
}
