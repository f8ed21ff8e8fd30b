//! Error types for flexgen
//!
//! Library code returns [`FlexgenResult`]; the binary wraps it in `anyhow`.
//! Every variant belongs to one [`ErrorKind`], which mirrors the three ways a
//! generation task can fail.

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;

/// Result type alias for flexgen operations
pub type FlexgenResult<T> = Result<T, FlexgenError>;

/// Coarse classification of a [`FlexgenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required input missing or unresolvable; raised before any process starts
    Configuration,
    /// Purging previous output (or other file access) failed
    Filesystem,
    /// The external generator failed
    Generation,
}

impl ErrorKind {
    /// Stable identifier used in JSON error events
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::Generation => "generation",
        }
    }
}

/// Main error type for flexgen operations
#[derive(Error, Debug)]
pub enum FlexgenError {
    /// A required task input was never set
    #[error("missing required input '{name}'")]
    MissingInput { name: &'static str },

    /// An input path does not point at a regular file
    #[error("{what} not found: {path}")]
    InputNotFound { what: &'static str, path: PathBuf },

    /// An input file exists but cannot be opened
    #[error("{what} is not readable: {path} ({source})")]
    UnreadableInput {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target class name cannot be turned into a file name
    #[error("invalid target class '{name}': {reason}")]
    InvalidTargetClass { name: String, reason: &'static str },

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// `--lexer` named an entry that is not in the configuration
    #[error("no lexer named '{name}' in configuration")]
    UnknownLexer { name: String },

    /// Nothing to generate: no `[[lexer]]` entries and no ad hoc flags
    #[error("no lexers configured")]
    NoLexers,

    /// Two configured lexers would write the same file
    #[error("lexers '{first}' and '{second}' both generate {path}")]
    DuplicateTarget {
        first: String,
        second: String,
        path: PathBuf,
    },

    /// Previous output could not be removed
    #[error("failed to remove previous output {path}: {source}")]
    Purge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The generator failed. The message is the generator's own console output.
    #[error("{message}")]
    Generation {
        message: String,
        #[source]
        source: ProcessError,
    },
}

impl FlexgenError {
    /// Build a generation error from captured console output.
    ///
    /// The output is trimmed. If nothing is left the cause's text is used so
    /// the message is never empty.
    pub fn generation(captured: &str, source: ProcessError) -> Self {
        let trimmed = captured.trim();
        let message = if trimmed.is_empty() {
            source.to_string()
        } else {
            trimmed.to_string()
        };
        FlexgenError::Generation { message, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FlexgenError::MissingInput { .. }
            | FlexgenError::InputNotFound { .. }
            | FlexgenError::UnreadableInput { .. }
            | FlexgenError::InvalidTargetClass { .. }
            | FlexgenError::InvalidConfig { .. }
            | FlexgenError::UnknownLexer { .. }
            | FlexgenError::NoLexers
            | FlexgenError::DuplicateTarget { .. } => ErrorKind::Configuration,
            FlexgenError::Purge { .. } | FlexgenError::Io(_) => ErrorKind::Filesystem,
            FlexgenError::Generation { .. } => ErrorKind::Generation,
        }
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            FlexgenError::InputNotFound { path, .. }
            | FlexgenError::UnreadableInput { path, .. }
            | FlexgenError::DuplicateTarget { path, .. }
            | FlexgenError::Purge { path, .. } => Some(path),
            FlexgenError::InvalidConfig { file, .. } => Some(file),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_missing_input() {
        let err = FlexgenError::MissingInput { name: "sourceFile" };
        assert_eq!(err.to_string(), "missing required input 'sourceFile'");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_display_input_not_found() {
        let err = FlexgenError::InputNotFound {
            what: "skeleton",
            path: PathBuf::from("grammar/idea.skeleton"),
        };
        assert_eq!(err.to_string(), "skeleton not found: grammar/idea.skeleton");
        assert_eq!(err.path(), Some(std::path::Path::new("grammar/idea.skeleton")));
    }

    #[test]
    fn test_purge_error_is_filesystem_kind() {
        let err = FlexgenError::Purge {
            path: PathBuf::from("gen/_Lexer.java"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().starts_with("failed to remove previous output gen/_Lexer.java"));
    }

    #[test]
    fn test_generation_message_is_trimmed_output() {
        let err = FlexgenError::generation(
            "\n  ERROR: bad rule at line 4\n\n",
            ProcessError::Exit { code: Some(1) },
        );
        assert_eq!(err.to_string(), "ERROR: bad rule at line 4");
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[test]
    fn test_generation_keeps_process_error_as_source() {
        use std::error::Error as _;

        let err = FlexgenError::generation("boom", ProcessError::Exit { code: Some(3) });
        let source = err.source().expect("generation error has a cause");
        assert_eq!(source.to_string(), "generator exited with code 3");
    }

    #[test]
    fn test_generation_falls_back_to_cause_when_output_blank() {
        let err = FlexgenError::generation("   \n", ProcessError::Exit { code: Some(2) });
        assert_eq!(err.to_string(), "generator exited with code 2");
    }

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::Configuration.code(), "configuration");
        assert_eq!(ErrorKind::Filesystem.code(), "filesystem");
        assert_eq!(ErrorKind::Generation.code(), "generation");
    }
}
