//! Common test utilities for flexgen CLI and integration tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project and home directories plus a runner for the binary
//! - Fixtures: grammars and a fake generator script

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
