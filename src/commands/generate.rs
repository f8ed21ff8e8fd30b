use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use flexgen::SystemRunner;

use super::Context;
use crate::cli::TaskArgs;

/// Run the generator for every selected lexer, stopping at the first failure
pub fn cmd_generate(ctx: &Context, args: &TaskArgs) -> Result<bool> {
    let started = Instant::now();
    let reporter = &ctx.reporter;
    reporter.start("generate");

    let tasks = ctx.tasks(args)?;

    // Ctrl+C kills the running generator
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel_clone.store(true, Ordering::SeqCst);
    }) {
        reporter.warn(&format!("cannot install Ctrl+C handler: {}", e));
    }
    let runner = SystemRunner::with_cancel_flag(cancel);

    let mut succeeded = 0;
    let mut failed = 0;

    for (name, task) in &tasks {
        let resolved = match task.resolve() {
            Ok(resolved) => resolved,
            Err(e) => {
                reporter.task_failed("generate", name, &anyhow::Error::from(e));
                failed += 1;
                break;
            }
        };

        reporter.task_started(name, &resolved);
        let mut mirror = reporter.mirror();
        match resolved.execute(&runner, &mut *mirror) {
            Ok(outcome) => {
                reporter.task_finished(name, &outcome);
                succeeded += 1;
            }
            Err(e) => {
                reporter.task_failed("generate", name, &anyhow::Error::from(e));
                failed += 1;
                break;
            }
        }
    }

    reporter.summary("generate", succeeded, failed, started.elapsed());
    Ok(failed == 0)
}
