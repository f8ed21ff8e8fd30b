//! Console reporting
//!
//! The reporter is the CLI's only logging surface. Text goes to stdout and is
//! gated by [`Verbosity`]; warnings and errors go to stderr. In JSON mode every
//! message becomes an NDJSON event instead.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crossterm::style::{Color, Stylize};

use flexgen::config::{ConfigWarning, Verbosity};
use flexgen::task::{GenerationOutcome, Purged, ResolvedTask};

use super::json::{self, ArgsEvent, CheckEvent, TaskFinishedEvent, TaskStartedEvent};
use super::terminal::TerminalCapabilities;

struct Icons {
    success: &'static str,
    error: &'static str,
    warning: &'static str,
    progress: &'static str,
    arrow: &'static str,
}

const UNICODE_ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    progress: "●",
    arrow: "→",
};

const ASCII_ICONS: Icons = Icons {
    success: "[OK]",
    error: "[FAIL]",
    warning: "[WARN]",
    progress: "[..]",
    arrow: "->",
};

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub verbosity: Verbosity,
    pub json: bool,
    pub color: bool,
    pub unicode: bool,
}

impl Reporter {
    pub fn new(verbosity: Verbosity, json: bool, caps: TerminalCapabilities) -> Self {
        Self {
            verbosity,
            json,
            color: caps.supports_color && !json,
            unicode: caps.supports_unicode,
        }
    }

    fn icons(&self) -> &'static Icons {
        if self.unicode {
            &UNICODE_ICONS
        } else {
            &ASCII_ICONS
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, Color::DarkGrey)
    }

    fn shows(&self, level: Verbosity) -> bool {
        !self.json && self.verbosity >= level
    }

    /// Where generator output is mirrored while it runs
    pub fn mirror(&self) -> Box<dyn Write> {
        if self.json {
            Box::new(io::stderr())
        } else if self.verbosity == Verbosity::Quiet {
            Box::new(io::sink())
        } else {
            Box::new(io::stdout())
        }
    }

    pub fn config_source(&self, source: Option<&Path>) {
        if self.shows(Verbosity::Verbose) {
            match source {
                Some(path) => println!("{}", self.dim(&format!("config: {}", path.display()))),
                None => println!("{}", self.dim("config: built-in defaults")),
            }
        }
    }

    pub fn config_warnings(&self, warnings: &[ConfigWarning]) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        let icon = self.paint(self.icons().warning, Color::Yellow);
        for w in warnings {
            match w.line {
                Some(line) => eprintln!(
                    "{} Unknown config key '{}' in {}:{}",
                    icon,
                    w.key,
                    w.file.display(),
                    line
                ),
                None => eprintln!("{} Unknown config key '{}' in {}", icon, w.key, w.file.display()),
            }
            if let Some(suggestion) = &w.suggestion {
                eprintln!("   Did you mean '{}'?", suggestion);
            }
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity != Verbosity::Quiet {
            eprintln!("{} {}", self.paint(self.icons().warning, Color::Yellow), message);
        }
    }

    pub fn task_started(&self, lexer: &str, task: &ResolvedTask) {
        let command_line = task.invocation().command_line();
        if self.json {
            let _ = json::emit(&TaskStartedEvent::new(lexer, &task.target_file, command_line));
            return;
        }
        if self.shows(Verbosity::Normal) {
            println!(
                "{} {} {} {}",
                self.paint(self.icons().progress, Color::Cyan),
                lexer,
                self.icons().arrow,
                task.target_file.display()
            );
        }
        if self.shows(Verbosity::Verbose) {
            println!("  {}", self.dim(&format!("$ {}", command_line)));
        }
    }

    pub fn task_finished(&self, lexer: &str, outcome: &GenerationOutcome) {
        if self.json {
            let _ = json::emit(&TaskFinishedEvent {
                event: "task_finished",
                lexer,
                target_file: &outcome.target_file,
                changed: outcome.changed,
                purged: outcome.purged,
                fingerprint: &outcome.fingerprint,
                digest: outcome.digest.as_ref(),
                duration_ms: millis(outcome.elapsed),
            });
            return;
        }

        if self.shows(Verbosity::Verbose) && outcome.purged != Purged::Nothing {
            println!(
                "  {}",
                self.dim(&format!("purged previous output ({:?})", outcome.purged).to_lowercase())
            );
        }
        if outcome.digest.is_none() {
            self.warn(&format!(
                "{}: generator succeeded but {} does not exist; does %class match the target class?",
                lexer,
                outcome.target_file.display()
            ));
        }
        if self.shows(Verbosity::Normal) {
            let status = if outcome.changed { "updated" } else { "unchanged" };
            println!(
                "{} {} {} in {}ms",
                self.paint(self.icons().success, Color::Green),
                lexer,
                status,
                millis(outcome.elapsed)
            );
        }
        if self.shows(Verbosity::Debug) {
            println!("  {}", self.dim(&format!("inputs {}", outcome.fingerprint)));
            if let Some(digest) = &outcome.digest {
                println!("  {}", self.dim(&format!("output {}", digest)));
            }
        }
    }

    /// Print an error for one lexer (stderr in text mode, an event in JSON mode)
    pub fn task_failed(&self, command: &str, lexer: &str, err: &anyhow::Error) {
        if self.json {
            let code = super::error::error_code(err);
            let _ = json::emit(
                &json::ErrorEvent::new(command, code, err.to_string()).for_lexer(lexer),
            );
            return;
        }
        eprint!(
            "{}",
            super::error::format_error_with(err, Some(lexer), self.color, self.unicode)
        );
    }

    /// `flexgen args` output; printed at every verbosity since it is the result
    pub fn command_line(&self, lexer: &str, task: &ResolvedTask) {
        let invocation = task.invocation();
        if self.json {
            let _ = json::emit(&ArgsEvent {
                event: "args",
                lexer,
                program: invocation.program.to_string_lossy().into_owned(),
                args: invocation
                    .args
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
                command_line: invocation.command_line(),
            });
            return;
        }
        if self.verbosity >= Verbosity::Verbose {
            println!("{}", self.dim(&format!("# {}", lexer)));
        }
        println!("{}", invocation.command_line());
    }

    pub fn check_passed(&self, lexer: &str, task: &ResolvedTask) {
        if self.json {
            let _ = json::emit(&CheckEvent {
                event: "check",
                lexer,
                valid: true,
                target_file: Some(&task.target_file),
                message: None,
            });
            return;
        }
        if self.shows(Verbosity::Normal) {
            println!(
                "{} {} {} {}",
                self.paint(self.icons().success, Color::Green),
                lexer,
                self.icons().arrow,
                task.target_file.display()
            );
        }
    }

    pub fn check_failed(&self, lexer: &str, err: &flexgen::FlexgenError) {
        if self.json {
            let _ = json::emit(&CheckEvent {
                event: "check",
                lexer,
                valid: false,
                target_file: None,
                message: Some(err.to_string()),
            });
            return;
        }
        eprintln!(
            "{} {}: {}",
            self.paint(self.icons().error, Color::Red),
            lexer,
            err
        );
    }

    pub fn summary(&self, command: &str, succeeded: usize, failed: usize, elapsed: Duration) {
        if self.json {
            let _ = json::emit(
                &json::CompleteEvent::new(command, failed == 0).with_duration(millis(elapsed)),
            );
            return;
        }
        if self.shows(Verbosity::Verbose) || (failed > 0 && self.shows(Verbosity::Normal)) {
            println!(
                "{}",
                self.dim(&format!(
                    "{}: {} ok, {} failed in {}ms",
                    command,
                    succeeded,
                    failed,
                    millis(elapsed)
                ))
            );
        }
    }

    pub fn start(&self, command: &str) {
        if self.json {
            let _ = json::emit(&json::StartEvent::new(command));
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(color: bool, unicode: bool) -> TerminalCapabilities {
        TerminalCapabilities {
            supports_color: color,
            supports_unicode: unicode,
            is_ci: false,
        }
    }

    #[test]
    fn json_mode_never_colors() {
        let reporter = Reporter::new(Verbosity::Normal, true, caps(true, true));
        assert!(!reporter.color);
        assert!(!reporter.shows(Verbosity::Quiet));
    }

    #[test]
    fn verbosity_gates_messages() {
        let reporter = Reporter::new(Verbosity::Normal, false, caps(false, true));
        assert!(reporter.shows(Verbosity::Normal));
        assert!(!reporter.shows(Verbosity::Verbose));

        let quiet = Reporter::new(Verbosity::Quiet, false, caps(false, true));
        assert!(!quiet.shows(Verbosity::Normal));
    }

    #[test]
    fn paint_is_plain_without_color() {
        let reporter = Reporter::new(Verbosity::Normal, false, caps(false, false));
        assert_eq!(reporter.paint("ok", Color::Green), "ok");
        assert_eq!(reporter.icons().success, "[OK]");
    }

    #[test]
    fn paint_adds_escape_codes_with_color() {
        let reporter = Reporter::new(Verbosity::Normal, false, caps(true, true));
        let painted = reporter.paint("ok", Color::Green);
        assert!(painted.contains("ok"));
    }
}
