//! flexgen CLI - run a JFlex-style lexer generator
//!
//! Usage: flexgen <COMMAND>
//!
//! Commands:
//!   generate  Run the generator for the selected lexers
//!   args      Print the generator command line
//!   check     Validate lexer inputs without running anything

mod cli;
mod commands;
mod ui;

use clap::Parser;

use cli::{Cli, Commands};
use commands::Context;

fn main() {
    let cli = Cli::parse();
    let command = cli.command.name();

    let result = Context::from_cli(&cli).and_then(|ctx| match &cli.command {
        Commands::Generate(args) => commands::generate::cmd_generate(&ctx, args),
        Commands::Args(args) => commands::args::cmd_args(&ctx, args),
        Commands::Check(args) => commands::check::cmd_check(&ctx, args),
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            if cli.json {
                let code = ui::error::error_code(&e);
                let _ = ui::json::emit(&ui::json::ErrorEvent::new(command, code, format!("{:#}", e)));
            } else {
                eprint!("{}", ui::error::format_error(&e));
            }
            std::process::exit(1);
        }
    }
}
