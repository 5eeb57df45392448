//! # Output Styling
//!
//! Terminal styling for the `lockweave` commands. Colour is decided once per
//! run from the `--color` flag and the environment:
//! - `--color=never|always|auto`
//! - `NO_COLOR` disables colours when set, even if empty (https://no-color.org/)
//! - `CLICOLOR=0` disables colours
//! - `CLICOLOR_FORCE=1` forces colours even when stdout is not a TTY
//! - `TERM=dumb` disables colours
//!
//! When colour is off, status markers fall back to bracketed plain text so
//! that output stays greppable in CI logs.

use std::env;

use console::{style, Style};

use crate::package::{Categories, LockedPackage};

/// Output configuration for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

/// Kinds of status line the commands print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Stale,
    Error,
    Info,
}

impl OutputConfig {
    /// Resolve colour support from the `--color` value and the environment.
    /// Unknown values behave like `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Marker printed at the start of a status line.
    pub fn marker(&self, status: Status) -> String {
        let (symbol, plain, color) = match status {
            Status::Ok => ("✔", "[OK]", Style::new().green()),
            Status::Stale => ("↻", "[STALE]", Style::new().yellow()),
            Status::Error => ("✘", "[ERR]", Style::new().red().bold()),
            Status::Info => ("•", "[INFO]", Style::new().cyan()),
        };
        if self.use_color {
            color.apply_to(symbol).force_styling(true).to_string()
        } else {
            plain.to_string()
        }
    }

    /// Render a category set as `[main, test]`, with the unconditional
    /// category emphasised.
    pub fn categories(&self, categories: &Categories, unconditional: &str) -> String {
        let labels: Vec<String> = categories
            .iter()
            .map(|category| {
                if !self.use_color {
                    category.clone()
                } else if category == unconditional {
                    style(category).green().bold().force_styling(true).to_string()
                } else {
                    style(category).magenta().force_styling(true).to_string()
                }
            })
            .collect();
        format!("[{}]", labels.join(", "))
    }

    /// One-line description of a locked package: `name version (manager) [cats]`.
    pub fn package(&self, package: &LockedPackage, unconditional: &str) -> String {
        let name = if self.use_color {
            style(package.name()).bold().force_styling(true).to_string()
        } else {
            package.name().to_string()
        };
        format!(
            "{} {} ({}) {}",
            name,
            package.node.version,
            package.manager(),
            self.categories(&package.categories, unconditional)
        )
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
