//! Rendering of command results as tables, field lists or JSON.

use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use syncdesk_core::result::AppResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and field lists
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Marker shown in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Notice,
    Failed,
}

/// Renders command results in one output format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print rows as a table, or as a JSON array.
    pub fn rows<T: Serialize + Tabled>(&self, rows: &[T]) -> AppResult<()> {
        match self.format {
            OutputFormat::Table if rows.is_empty() => println!("(nothing to show)"),
            OutputFormat::Table => {
                let mut table = Table::new(rows);
                table.with(Style::modern());
                println!("{table}");
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        }
        Ok(())
    }

    /// Print one record. In table mode every top-level field becomes a
    /// `key: value` line.
    pub fn record<T: Serialize>(&self, value: &T) -> AppResult<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => match serde_json::to_value(value)? {
                Value::Object(fields) => {
                    for (key, value) in &fields {
                        field(key, &scalar(value));
                    }
                }
                other => println!("{}", scalar(&other)),
            },
        }
        Ok(())
    }
}

/// Print a one-line status message.
pub fn status(mark: Mark, message: &str) {
    match mark {
        Mark::Done => println!("[ok] {message}"),
        Mark::Notice => println!("[--] {message}"),
        Mark::Failed => eprintln!("[!!] {message}"),
    }
}

/// Print an aligned `key: value` line.
pub fn field(key: &str, value: &str) {
    println!("  {:<24} {value}", format!("{key}:"));
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
