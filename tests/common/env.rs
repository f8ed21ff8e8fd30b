//! Test environment builder for isolated flexgen testing.
//!
//! Provides `TestEnv` - temp directories for the project and for HOME, a fake
//! generator script inside the project, and helpers to run the CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::fixtures::FAKE_GENERATOR;

/// Name of the fake generator script inside the project
pub const GENERATOR_SCRIPT: &str = "tools/fake-jflex.sh";

/// Result of running a flexgen CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse every stdout line as a JSON event
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|e| panic!("not a JSON event: {line}: {e}"))
            })
            .collect()
    }
}

/// Isolated project and home directories
pub struct TestEnv {
    pub project_root: TempDir,
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            project_root: tempfile::tempdir().expect("Failed to create project dir"),
            home_dir: tempfile::tempdir().expect("Failed to create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_flexgen")),
        };
        env.write(GENERATOR_SCRIPT, FAKE_GENERATOR);
        env
    }

    /// Canonical project root, as the binary sees it through `current_dir`
    pub fn root(&self) -> PathBuf {
        self.project_root
            .path()
            .canonicalize()
            .expect("Failed to canonicalize project root")
    }

    /// Get path relative to project root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file to the project directory
    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.project_root.path().join(relative);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// TOML array running the fake generator through `sh`
    pub fn generator_command_toml(&self) -> String {
        format!("[\"sh\", '{}']", self.path(GENERATOR_SCRIPT).display())
    }

    /// Write `flexgen.toml` with the fake generator followed by `lexers`
    pub fn write_config(&self, lexers: &str) {
        let config = format!(
            "[generator]\ncommand = {}\n\n{}",
            self.generator_command_toml(),
            lexers
        );
        self.write("flexgen.toml", &config);
    }

    /// Arguments the fake generator received on its last run
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let path = self.path("tools/args.txt");
        let content = std::fs::read_to_string(path).ok()?;
        Some(content.lines().map(str::to_string).collect())
    }

    /// Flags that make an ad hoc run use the fake generator
    pub fn generator_flags(&self) -> Vec<String> {
        vec![
            "--generator".to_string(),
            "sh".to_string(),
            "--generator-arg".to_string(),
            self.path(GENERATOR_SCRIPT).display().to_string(),
        ]
    }

    /// Run flexgen from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from(self.project_root.path(), args, env_vars)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(cwd)
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("FLEXGEN_NO_COLOR", "1")
            .env("LANG", "C")
            .env_remove("LC_ALL")
            .env_remove("LC_CTYPE")
            .env_remove("FLEXGEN_GENERATOR")
            .env_remove("FLEXGEN_TIMEOUT_SECS")
            .env_remove("FLEXGEN_VERBOSITY");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute flexgen");
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
