//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlexgenError, FlexgenResult};
use crate::task::{paths, GeneratorCommand, LexerTask};

use super::loader::{self, ConfigWarning};

/// How to launch the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Program followed by its leading arguments
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Kill the generator after this many seconds (no limit when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout_secs: None,
        }
    }
}

fn default_command() -> Vec<String> {
    vec!["jflex".to_string()]
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "debug" => Some(Verbosity::Debug),
            _ => None,
        }
    }

    /// Map `-q` / `-v` counts onto a level, starting from `self`
    pub fn adjusted(self, quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => self,
            1 => self.max(Verbosity::Verbose),
            _ => Verbosity::Debug,
        }
    }
}

/// One `[[lexer]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LexerConfig {
    pub name: String,

    #[serde(default)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub skeleton: Option<PathBuf>,

    #[serde(default)]
    pub target_dir: Option<PathBuf>,

    #[serde(default)]
    pub target_class: Option<String>,

    /// Overrides `target_dir` as the generator's output directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub purge_old_files: bool,
}

impl LexerConfig {
    /// Build a task; missing fields are left unset so the task reports them
    pub fn to_task(&self, project_dir: &Path, generator: &GeneratorConfig) -> LexerTask {
        let mut task = LexerTask::new(project_dir)
            .purge_old_files(self.purge_old_files)
            .generator(generator.generator_command());
        if let Some(source) = &self.source {
            task = task.source_file(source);
        }
        if let Some(skeleton) = &self.skeleton {
            task = task.skeleton(skeleton);
        }
        if let Some(dir) = &self.target_dir {
            task = task.target_dir(dir);
        }
        if let Some(class) = &self.target_class {
            task = task.target_class(class);
        }
        if let Some(dir) = &self.output_dir {
            task = task.target_output_dir(dir);
        }
        task.timeout(generator.timeout())
    }
}

impl GeneratorConfig {
    /// Falls back to the default when `command` is empty
    pub fn generator_command(&self) -> GeneratorCommand {
        GeneratorCommand::from_parts(self.command.iter().cloned()).unwrap_or_default()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default, rename = "lexer")]
    pub lexers: Vec<LexerConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> FlexgenResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> FlexgenResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (FLEXGEN_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    pub fn lexer(&self, name: &str) -> FlexgenResult<&LexerConfig> {
        self.lexers
            .iter()
            .find(|lexer| lexer.name == name)
            .ok_or_else(|| FlexgenError::UnknownLexer {
                name: name.to_string(),
            })
    }

    /// Select lexers by name; an empty selection means all of them
    pub fn select_lexers(&self, names: &[String]) -> FlexgenResult<Vec<&LexerConfig>> {
        if names.is_empty() {
            return Ok(self.lexers.iter().collect());
        }
        names.iter().map(|name| self.lexer(name)).collect()
    }

    /// Tasks for the selected lexers, paired with their names.
    ///
    /// Fails if two selected lexers would write the same target file.
    pub fn tasks(
        &self,
        project_dir: &Path,
        names: &[String],
    ) -> FlexgenResult<Vec<(String, LexerTask)>> {
        let tasks: Vec<(String, LexerTask)> = self
            .select_lexers(names)?
            .into_iter()
            .map(|lexer| (lexer.name.clone(), lexer.to_task(project_dir, &self.generator)))
            .collect();

        let targets: Vec<Option<PathBuf>> = tasks
            .iter()
            .map(|(_, task)| task.target_file().map(|path| paths::normalize(&path)))
            .collect();

        for (i, (first, task)) in tasks.iter().enumerate() {
            let Some(path) = task.target_file() else {
                continue;
            };
            let normalized = paths::normalize(&path);
            if let Some(j) = targets[i + 1..]
                .iter()
                .position(|other| other.as_ref() == Some(&normalized))
            {
                let second = &tasks[i + 1 + j].0;
                return Err(FlexgenError::DuplicateTarget {
                    first: first.clone(),
                    second: second.clone(),
                    path,
                });
            }
        }

        Ok(tasks)
    }
}
