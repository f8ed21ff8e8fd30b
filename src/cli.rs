//! CLI Argument Parsing
//!
//! Global flags (--json, --color, --verbose, --quiet, --config, -C) are
//! inherited by all subcommands. Every subcommand takes the same task
//! selection flags: either `--lexer` names from the configuration, or ad hoc
//! flags describing a single lexer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// flexgen - run a JFlex-style lexer generator for grammar files
#[derive(Parser, Debug)]
#[command(name = "flexgen")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Lexers are read from flexgen.toml unless --source is given.")]
pub struct Cli {
    /// Emit NDJSON events on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: <project dir>/flexgen.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory relative paths are resolved against
    #[arg(short = 'C', long = "project-dir", global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the generator for the selected lexers
    Generate(TaskArgs),

    /// Print the generator command line without running anything
    Args(TaskArgs),

    /// Validate lexer inputs without running the generator
    Check(TaskArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Generate(_) => "generate",
            Commands::Args(_) => "args",
            Commands::Check(_) => "check",
        }
    }

    pub fn task_args(&self) -> &TaskArgs {
        match self {
            Commands::Generate(args) | Commands::Args(args) | Commands::Check(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    /// Only process this configured lexer (repeatable)
    #[arg(short, long = "lexer", value_name = "NAME")]
    pub lexers: Vec<String>,

    /// Grammar file for an ad hoc lexer
    #[arg(long, value_name = "FILE", conflicts_with = "lexers")]
    pub source: Option<PathBuf>,

    /// Skeleton file for an ad hoc lexer
    #[arg(long, value_name = "FILE", requires = "source")]
    pub skeleton: Option<PathBuf>,

    /// Directory the generated class belongs in
    #[arg(long, value_name = "DIR", requires = "source")]
    pub target_dir: Option<PathBuf>,

    /// Name of the generated lexer class
    #[arg(long, value_name = "NAME", requires = "source")]
    pub target_class: Option<String>,

    /// Write output here instead of --target-dir
    #[arg(long, value_name = "DIR", requires = "source")]
    pub output_dir: Option<PathBuf>,

    /// Delete the previous output file before generating
    #[arg(long)]
    pub purge: bool,

    /// Generator program (overrides configuration)
    #[arg(long, value_name = "PROGRAM")]
    pub generator: Option<String>,

    /// Leading argument passed to the generator program (repeatable)
    #[arg(long = "generator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,

    /// Kill the generator after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl TaskArgs {
    /// Whether the flags describe a lexer instead of selecting configured ones
    pub fn is_ad_hoc(&self) -> bool {
        self.source.is_some()
    }
}
