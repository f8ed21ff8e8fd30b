//! Console presentation: terminal detection, text reporting, JSON events

pub mod error;
pub mod json;
pub mod output;
pub mod terminal;

pub use output::Reporter;
