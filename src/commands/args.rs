use anyhow::Result;

use super::Context;
use crate::cli::TaskArgs;

/// Print the command line `generate` would run for each selected lexer
pub fn cmd_args(ctx: &Context, args: &TaskArgs) -> Result<bool> {
    let reporter = &ctx.reporter;
    let mut ok = true;

    for (name, task) in ctx.tasks(args)? {
        match task.resolve() {
            Ok(resolved) => reporter.command_line(&name, &resolved),
            Err(e) => {
                reporter.task_failed("args", &name, &anyhow::Error::from(e));
                ok = false;
            }
        }
    }

    Ok(ok)
}
