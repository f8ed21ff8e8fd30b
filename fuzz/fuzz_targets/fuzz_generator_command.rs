#![no_main]

use std::ffi::OsStr;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        if let Some(command) = flexgen::GeneratorCommand::parse(line) {
            assert!(!command.program.trim().is_empty());
        }
        let quoted = flexgen::process::shell_quote(OsStr::new(line));
        assert!(!quoted.is_empty());
    }
});
