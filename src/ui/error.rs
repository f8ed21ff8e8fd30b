use std::error::Error as _;

use crossterm::style::Stylize;

use flexgen::{ErrorKind, FlexgenError};

/// Stable code for JSON error events
pub fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<FlexgenError>() {
        Some(flexgen) => flexgen.kind().code(),
        None => "error",
    }
}

pub fn format_error(err: &anyhow::Error) -> String {
    let caps = crate::ui::terminal::detect_capabilities().with_color_choice(None);
    format_error_with(err, None, caps.supports_color, caps.supports_unicode)
}

pub fn format_error_with(
    err: &anyhow::Error,
    lexer: Option<&str>,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let icon = if supports_unicode { "✗" } else { "[ERROR]" };
    let icon = if supports_color {
        icon.red().bold().to_string()
    } else {
        icon.to_string()
    };
    let prefix = match lexer {
        Some(name) => format!("{} {}: ", icon, name),
        None => format!("{} ", icon),
    };

    let Some(flexgen) = err.downcast_ref::<FlexgenError>() else {
        return format!("{}{:#}\n", prefix, err);
    };

    match flexgen.kind() {
        ErrorKind::Generation => {
            let bar = if supports_unicode { "│" } else { "|" };
            let mut out = format!("{}generation failed\n", prefix);
            for line in flexgen.to_string().lines() {
                out.push_str(&format!("  {} {}\n", bar, line));
            }
            if let Some(cause) = flexgen.source() {
                out.push_str(&format!("  caused by: {}\n", cause));
            }
            out
        }
        ErrorKind::Configuration => {
            let mut out = format!("{}configuration error: {}\n", prefix, flexgen);
            if let Some(fix) = configuration_fix(flexgen) {
                out.push_str(&format!("  fix: {}\n", fix));
            }
            out
        }
        ErrorKind::Filesystem => format!("{}filesystem error: {}\n", prefix, flexgen),
    }
}

fn configuration_fix(err: &FlexgenError) -> Option<&'static str> {
    match err {
        FlexgenError::MissingInput { name: "sourceFile" } => {
            Some("set `source` in the [[lexer]] entry or pass --source")
        }
        FlexgenError::MissingInput { name: "targetDir" } => {
            Some("set `target_dir` in the [[lexer]] entry or pass --target-dir")
        }
        FlexgenError::MissingInput { name: "targetClass" } => {
            Some("set `target_class` in the [[lexer]] entry or pass --target-class")
        }
        FlexgenError::NoLexers => Some(
            "add a [[lexer]] entry to flexgen.toml or pass --source, --target-dir and --target-class",
        ),
        FlexgenError::DuplicateTarget { .. } => {
            Some("give each lexer its own target_dir or target_class")
        }
        _ => None,
    }
}
