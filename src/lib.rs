//! flexgen - lexer generation task runner
//!
//! flexgen drives an external JFlex-style lexer generator for IDE plugin
//! grammars: it derives the output paths for a grammar, optionally clears the
//! previous output, runs the generator with a fixed argument layout, and turns
//! a failed run into an error carrying the generator's own console output.

pub mod config;
pub mod error;
pub mod process;
pub mod task;

// Re-exports for convenience
pub use config::{Config, LexerConfig, Verbosity};
pub use error::{ErrorKind, FlexgenError, FlexgenResult};
pub use process::{Invocation, ProcessRunner, SystemRunner, TeeWriter};
pub use task::{GenerationOutcome, GeneratorCommand, LexerTask, ResolvedTask};
