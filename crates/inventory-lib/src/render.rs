//! View rendering
//!
//! Renders a [`View`] as an aligned text table, `;`-delimited text or a JSON
//! document. Only the table format humanizes size columns; the other
//! formats always carry raw figures.

use crate::units::humanize;
use crate::views::{Layout, View};
use serde::Deserialize;

const GUTTER: &str = "  ";
const DELIMITER: &str = ";";

/// Output format for views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns (default)
    #[default]
    Table,
    /// Semicolon-separated values
    #[serde(alias = "csv")]
    Delimited,
    /// JSON document
    #[serde(alias = "json")]
    Structured,
}

/// Rendering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Rewrite `..mb` columns as human-readable sizes (table only)
    pub humanize: bool,
    /// Print the header line (and the rule under it for tables)
    pub header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            humanize: false,
            header: true,
        }
    }
}

/// Render a view; the result ends with a newline unless it is empty
pub fn render(
    view: &View,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(view, options)),
        OutputFormat::Delimited => Ok(render_delimited(view, options)),
        OutputFormat::Structured => render_structured(view),
    }
}

/// Whether a column holds sizes in MiB
pub fn is_mb_column(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with("mb")
}

fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn table_cell(header: &str, value: Option<&serde_json::Value>, humanize_sizes: bool) -> String {
    if humanize_sizes && is_mb_column(header) {
        let mib = value.and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
        });
        if let Some(mib) = mib {
            return humanize(mib);
        }
    }
    cell_text(value)
}

fn render_table(view: &View, options: RenderOptions) -> String {
    let cells: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            view.headers
                .iter()
                .map(|h| table_cell(h, row.get(h), options.humanize))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = view.headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let pad = |fields: &[String]| -> String {
        fields
            .iter()
            .zip(&widths)
            .map(|(field, &width)| format!("{field:<width$}"))
            .collect::<Vec<_>>()
            .join(GUTTER)
    };

    let mut out = String::new();
    if options.header {
        out.push_str(&pad(&view.headers));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join(GUTTER));
        out.push('\n');
    }
    for line in &cells {
        out.push_str(&pad(line));
        out.push('\n');
    }
    out
}

fn render_delimited(view: &View, options: RenderOptions) -> String {
    let mut out = String::new();

    if options.header && view.layout == Layout::Records {
        out.push_str(&view.headers.join(DELIMITER));
        out.push('\n');
    }
    for row in &view.rows {
        let fields: Vec<String> = view.headers.iter().map(|h| cell_text(row.get(h))).collect();
        out.push_str(&fields.join(DELIMITER));
        out.push('\n');
    }
    out
}

fn render_structured(view: &View) -> Result<String, serde_json::Error> {
    let mut out = match view.layout {
        Layout::Records => serde_json::to_string_pretty(&view.rows)?,
        Layout::List => {
            let values: Vec<&serde_json::Value> = view
                .rows
                .iter()
                .filter_map(|row| view.headers.first().and_then(|h| row.get(h)))
                .collect();
            serde_json::to_string_pretty(&values)?
        }
    };
    out.push('\n');
    Ok(out)
}
