//! Table formatting and console output utilities
//!
//! This module provides colored status lines and tabular output in the
//! formats accepted by `--format`.

use crate::error::{LokigenError, Result};
use crossterm::style::{Color as CrosstermColor, Stylize};
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style},
    Table, Tabled,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Color theme for console output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub header: CrosstermColor,
    pub success: CrosstermColor,
    pub warning: CrosstermColor,
    pub info: CrosstermColor,
    pub accent: CrosstermColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            header: CrosstermColor::Blue,
            success: CrosstermColor::Green,
            warning: CrosstermColor::Yellow,
            info: CrosstermColor::Cyan,
            accent: CrosstermColor::Magenta,
        }
    }
}

/// Render rows in the requested format
pub fn format_rows<T: Tabled + Serialize>(rows: &[T], format: OutputFormat, no_color: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(Table::new(rows), no_color)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Yaml => serde_yaml::to_string(rows).map_err(|e| LokigenError::encoding(e.to_string())),
    }
}

/// Display utilities for status messages
pub struct DisplayUtils {
    theme: ColorTheme,
    no_color: bool,
}

impl DisplayUtils {
    pub fn new(no_color: bool) -> Self {
        Self {
            theme: ColorTheme::default(),
            no_color,
        }
    }

    fn styled(&self, symbol: &str, message: &str, color: CrosstermColor) -> String {
        if self.no_color {
            format!("{symbol} {message}")
        } else {
            format!("{symbol} {}", message.with(color))
        }
    }

    /// Print a section header
    pub fn print_header(&self, title: &str) {
        if self.no_color {
            println!("=== {title} ===");
        } else {
            println!("=== {} ===", title.with(self.theme.header).bold());
        }
    }

    pub fn print_success(&self, message: &str) {
        println!("{}", self.styled("✓", message, self.theme.success));
    }

    pub fn print_warning(&self, message: &str) {
        eprintln!("{}", self.styled("⚠", message, self.theme.warning));
    }

    pub fn print_info(&self, message: &str) {
        println!("{}", self.styled("ℹ", message, self.theme.info));
    }

    /// Format key-value pairs with aligned keys
    pub fn format_key_value_pairs(&self, pairs: &[(&str, &str)]) -> String {
        let max_key_length = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

        pairs
            .iter()
            .map(|(key, value)| {
                let padded = format!("{key:max_key_length$}");
                let formatted_key = if self.no_color {
                    padded
                } else {
                    padded.with(self.theme.accent).bold().to_string()
                };
                format!("{formatted_key}: {value}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Convenience function for formatting a table with default settings
pub fn format_table(mut table: Table, no_color: bool) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Padding::new(1, 1, 0, 0));

    if !no_color {
        table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
    }

    table.to_string()
}
