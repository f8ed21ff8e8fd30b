#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Parsing, warning collection and task derivation must never panic
        let path = Path::new("flexgen.toml");
        if let Ok((config, _warnings)) = flexgen::config::parse_with_warnings(content, path) {
            if let Ok(tasks) = config.tasks(Path::new("/fuzz/project"), &[]) {
                for (_, task) in tasks {
                    let _ = task.target_file();
                }
            }
        }
    }
});
