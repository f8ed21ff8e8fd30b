//! Configuration module for flexgen
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (FLEXGEN_*)
//! 3. Project config (`--config`, else `<project>/flexgen.toml`)
//! 4. User config (`<config dir>/flexgen/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load_or_default, load_with_warnings, parse_with_warnings, user_config_path, ConfigWarning,
    LoadedConfig, PROJECT_CONFIG_FILE,
};
pub use types::{Config, GeneratorConfig, LexerConfig, OutputConfig, Verbosity};
