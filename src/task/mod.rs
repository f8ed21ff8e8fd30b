//! Lexer generation task
//!
//! A [`LexerTask`] collects declarative inputs through builder calls. Nothing
//! is derived until [`LexerTask::resolve`] validates the inputs and produces
//! an immutable [`ResolvedTask`], which owns every derived path and knows how
//! to run the generator.
//!
//! ```no_run
//! use flexgen::process::SystemRunner;
//! use flexgen::task::LexerTask;
//!
//! let outcome = LexerTask::new("/work/plugin")
//!     .source_file("src/grammar/Simple.flex")
//!     .target_dir("src/gen/org/example/lexer")
//!     .target_class("_SimpleLexer")
//!     .purge_old_files(true)
//!     .execute(&SystemRunner::new(), &mut std::io::stdout())?;
//! println!("wrote {}", outcome.target_file.display());
//! # Ok::<(), flexgen::FlexgenError>(())
//! ```

pub mod args;
pub mod fingerprint;
pub mod paths;
pub mod purge;

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{FlexgenError, FlexgenResult};
use crate::process::{Invocation, ProcessRunner};

pub use fingerprint::ContentDigest;
pub use paths::OUTPUT_EXTENSION;
pub use purge::Purged;

/// Program (plus leading arguments) that launches the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for GeneratorCommand {
    fn default() -> Self {
        Self {
            program: "jflex".to_string(),
            args: Vec::new(),
        }
    }
}

impl GeneratorCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// First element is the program, the rest are leading arguments
    pub fn from_parts<I, S>(parts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = parts.into_iter().map(Into::into);
        let program = parts.next().filter(|p: &String| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Split a whitespace-separated command line (no quoting support)
    pub fn parse(line: &str) -> Option<Self> {
        Self::from_parts(line.split_whitespace())
    }
}

/// Declarative configuration of one generator run
#[derive(Debug, Clone)]
pub struct LexerTask {
    project_dir: PathBuf,
    source_file: Option<PathBuf>,
    skeleton: Option<PathBuf>,
    target_dir: Option<PathBuf>,
    target_class: Option<String>,
    target_output_dir: Option<PathBuf>,
    purge_old_files: bool,
    generator: GeneratorCommand,
    timeout: Option<Duration>,
}

impl LexerTask {
    /// Relative paths are resolved against `project_dir`
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            source_file: None,
            skeleton: None,
            target_dir: None,
            target_class: None,
            target_output_dir: None,
            purge_old_files: false,
            generator: GeneratorCommand::default(),
            timeout: None,
        }
    }

    pub fn source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn skeleton(mut self, path: impl Into<PathBuf>) -> Self {
        self.skeleton = Some(path.into());
        self
    }

    pub fn target_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(path.into());
        self
    }

    pub fn target_class(mut self, name: impl Into<String>) -> Self {
        self.target_class = Some(name.into());
        self
    }

    /// Write somewhere other than `target_dir`
    pub fn target_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_output_dir = Some(path.into());
        self
    }

    pub fn purge_old_files(mut self, purge: bool) -> Self {
        self.purge_old_files = purge;
        self
    }

    pub fn generator(mut self, generator: GeneratorCommand) -> Self {
        self.generator = generator;
        self
    }

    /// Kill the generator if it runs longer than this; `None` removes the limit
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn target_output_dir_path(&self) -> Option<PathBuf> {
        paths::target_output_dir(
            &self.project_dir,
            self.target_dir.as_deref(),
            self.target_output_dir.as_deref(),
        )
    }

    /// Where the generated file will land, if enough inputs are set
    pub fn target_file(&self) -> Option<PathBuf> {
        let class = self.target_class.as_deref()?;
        Some(paths::target_file(&self.target_output_dir_path()?, class))
    }

    /// Validate inputs and derive every path. Touches nothing on disk.
    pub fn resolve(&self) -> FlexgenResult<ResolvedTask> {
        let source = self
            .source_file
            .as_deref()
            .ok_or(FlexgenError::MissingInput { name: "sourceFile" })?;
        let source_file = paths::resolve_against(&self.project_dir, source);
        check_readable_file("source file", &source_file)?;

        let output_dir = self
            .target_output_dir_path()
            .ok_or(FlexgenError::MissingInput { name: "targetDir" })?;
        let target_class = self
            .target_class
            .clone()
            .ok_or(FlexgenError::MissingInput { name: "targetClass" })?;
        paths::validate_target_class(&target_class)?;

        let skeleton = match self.skeleton.as_deref() {
            Some(path) => {
                let path = paths::resolve_against(&self.project_dir, path);
                check_readable_file("skeleton", &path)?;
                Some(path)
            }
            None => None,
        };

        let target_file = paths::target_file(&output_dir, &target_class);
        Ok(ResolvedTask {
            project_dir: self.project_dir.clone(),
            source_file,
            skeleton,
            output_dir,
            target_class,
            target_file,
            purge_old_files: self.purge_old_files,
            generator: self.generator.clone(),
            timeout: self.timeout,
        })
    }

    /// Generator arguments for the current inputs
    pub fn arguments(&self) -> FlexgenResult<Vec<OsString>> {
        Ok(self.resolve()?.arguments())
    }

    /// Resolve, then run. See [`ResolvedTask::execute`].
    pub fn execute(
        &self,
        runner: &dyn ProcessRunner,
        console: &mut dyn Write,
    ) -> FlexgenResult<GenerationOutcome> {
        self.resolve()?.execute(runner, console)
    }
}

fn check_readable_file(what: &'static str, path: &Path) -> FlexgenResult<()> {
    let not_found = || FlexgenError::InputNotFound {
        what,
        path: path.to_path_buf(),
    };
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(not_found()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
        Err(source) => {
            return Err(FlexgenError::UnreadableInput {
                what,
                path: path.to_path_buf(),
                source,
            })
        }
    }
    fs::File::open(path)
        .map(|_| ())
        .map_err(|source| FlexgenError::UnreadableInput {
            what,
            path: path.to_path_buf(),
            source,
        })
}

/// Validated inputs and derived paths of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub project_dir: PathBuf,
    pub source_file: PathBuf,
    pub skeleton: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub target_class: String,
    pub target_file: PathBuf,
    pub purge_old_files: bool,
    pub generator: GeneratorCommand,
    pub timeout: Option<Duration>,
}

/// Result of a successful generator run
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The task's declared output
    pub target_file: PathBuf,
    /// Generator console output, trimmed
    pub output: String,
    pub fingerprint: ContentDigest,
    pub previous_digest: Option<ContentDigest>,
    pub digest: Option<ContentDigest>,
    /// Whether the target file differs from what was there before the run
    pub changed: bool,
    pub purged: Purged,
    pub elapsed: Duration,
}

impl ResolvedTask {
    pub fn arguments(&self) -> Vec<OsString> {
        args::build_arguments(&self.output_dir, self.skeleton.as_deref(), &self.source_file)
    }

    /// Full process invocation, run from the project directory
    pub fn invocation(&self) -> Invocation {
        Invocation::new(&self.generator.program)
            .args(&self.generator.args)
            .args(self.arguments())
            .current_dir(&self.project_dir)
            .timeout(self.timeout)
    }

    pub fn input_fingerprint(&self) -> FlexgenResult<ContentDigest> {
        fingerprint::input_fingerprint(self)
    }

    /// Purge (if asked), run the generator and report what happened.
    ///
    /// Generator output is mirrored to `console` while it runs. On failure the
    /// captured output becomes the error message.
    pub fn execute(
        &self,
        runner: &dyn ProcessRunner,
        console: &mut dyn Write,
    ) -> FlexgenResult<GenerationOutcome> {
        let started = Instant::now();
        let fingerprint = self.input_fingerprint()?;
        let previous_digest = fingerprint::file_digest(&self.target_file)?;

        let purged = if self.purge_old_files {
            purge::purge(&self.target_file)?
        } else {
            Purged::Nothing
        };

        let result = runner
            .run(&self.invocation(), console)
            .map_err(|failure| FlexgenError::generation(&failure.output, failure.error))?;

        let digest = fingerprint::file_digest(&self.target_file)?;
        Ok(GenerationOutcome {
            target_file: self.target_file.clone(),
            output: result.output.trim().to_string(),
            fingerprint,
            changed: previous_digest != digest,
            previous_digest,
            digest,
            purged,
            elapsed: started.elapsed(),
        })
    }
}
