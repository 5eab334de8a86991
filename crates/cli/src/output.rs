//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use inventory_lib::{render, RenderOptions, View};
use std::io::Write;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table (default)
    #[default]
    Table,
    /// Semicolon-separated values
    Csv,
    /// JSON format
    Json,
}

impl From<OutputFormat> for inventory_lib::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => inventory_lib::OutputFormat::Table,
            OutputFormat::Csv => inventory_lib::OutputFormat::Delimited,
            OutputFormat::Json => inventory_lib::OutputFormat::Structured,
        }
    }
}

/// Render a view to stdout
pub fn print_view(
    view: &View,
    format: inventory_lib::OutputFormat,
    options: RenderOptions,
) -> Result<()> {
    let text = render(view, format, options).context("Failed to render output")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write output")
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
