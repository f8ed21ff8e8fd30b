//! Command handlers
//!
//! Each handler returns `Ok(true)` when every selected lexer succeeded,
//! `Ok(false)` when at least one failed (already reported), and `Err` for
//! problems that stop the command before any lexer is processed.

pub mod args;
pub mod check;
pub mod generate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};

use flexgen::config::{self, LoadedConfig};
use flexgen::task::{GeneratorCommand, LexerTask};
use flexgen::FlexgenError;

use crate::cli::{Cli, TaskArgs};
use crate::ui::terminal::detect_capabilities;
use crate::ui::Reporter;

/// Name reported for a lexer described entirely by CLI flags
pub const AD_HOC_LEXER: &str = "cli";

/// Everything a command needs, resolved once from the CLI flags
pub struct Context {
    pub project_dir: PathBuf,
    pub loaded: LoadedConfig,
    pub reporter: Reporter,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_dir = project_dir(cli.project_dir.as_deref(), cli.config.as_deref())?;
        let loaded = config::load_or_default(&project_dir, cli.config.as_deref())?;

        let verbosity = loaded.config.output.verbosity.adjusted(cli.quiet, cli.verbose);
        let caps = detect_capabilities().with_color_choice(cli.color);
        let reporter = Reporter::new(verbosity, cli.json, caps);

        reporter.config_source(loaded.source.as_deref());
        reporter.config_warnings(&loaded.warnings);

        Ok(Self {
            project_dir,
            loaded,
            reporter,
        })
    }

    /// Named tasks selected by `args`, with CLI overrides applied
    pub fn tasks(&self, args: &TaskArgs) -> Result<Vec<(String, LexerTask)>> {
        let config = &self.loaded.config;

        let tasks = if args.is_ad_hoc() {
            let mut task = LexerTask::new(&self.project_dir)
                .generator(config.generator.generator_command())
                .timeout(config.generator.timeout());
            if let Some(source) = &args.source {
                task = task.source_file(source);
            }
            if let Some(skeleton) = &args.skeleton {
                task = task.skeleton(skeleton);
            }
            if let Some(dir) = &args.target_dir {
                task = task.target_dir(dir);
            }
            if let Some(class) = &args.target_class {
                task = task.target_class(class);
            }
            if let Some(dir) = &args.output_dir {
                task = task.target_output_dir(dir);
            }
            vec![(AD_HOC_LEXER.to_string(), task)]
        } else {
            if config.lexers.is_empty() {
                return Err(FlexgenError::NoLexers.into());
            }
            config.tasks(&self.project_dir, &args.lexers)?
        };

        Ok(tasks
            .into_iter()
            .map(|(name, task)| (name, apply_overrides(task, args)))
            .collect())
    }
}

fn apply_overrides(mut task: LexerTask, args: &TaskArgs) -> LexerTask {
    if args.purge {
        task = task.purge_old_files(true);
    }
    if let Some(program) = &args.generator {
        let command = args
            .generator_args
            .iter()
            .fold(GeneratorCommand::new(program), |cmd, arg| cmd.arg(arg));
        task = task.generator(command);
    }
    // --timeout 0 clears any configured limit
    if let Some(secs) = args.timeout {
        task = task.timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    task
}

/// `-C` wins, then the directory holding `--config`, then the current directory
fn project_dir(explicit: Option<&Path>, config: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let dir = match (explicit, config.and_then(Path::parent)) {
        (Some(dir), _) => cwd.join(dir),
        (None, Some(parent)) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd,
    };
    Ok(dir)
}
