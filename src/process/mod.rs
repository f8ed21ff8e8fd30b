//! Process invocation helper owned by the generation task

mod runner;
mod tee;

pub use runner::{
    shell_quote, Invocation, ProcessError, ProcessFailure, ProcessOutput, ProcessRunner,
    SystemRunner,
};
pub use tee::TeeWriter;
