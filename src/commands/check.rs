use std::time::Instant;

use anyhow::Result;

use super::Context;
use crate::cli::TaskArgs;

/// Validate every selected lexer without launching the generator.
///
/// Unlike `generate`, all lexers are checked even after one fails.
pub fn cmd_check(ctx: &Context, args: &TaskArgs) -> Result<bool> {
    let started = Instant::now();
    let reporter = &ctx.reporter;
    reporter.start("check");

    let mut passed = 0;
    let mut failed = 0;

    for (name, task) in ctx.tasks(args)? {
        match task.resolve() {
            Ok(resolved) => {
                reporter.check_passed(&name, &resolved);
                passed += 1;
            }
            Err(e) => {
                reporter.check_failed(&name, &e);
                failed += 1;
            }
        }
    }

    reporter.summary("check", passed, failed, started.elapsed());
    Ok(failed == 0)
}
