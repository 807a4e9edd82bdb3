use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use radariq_protocol::Outcome;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be printed in every output format.
pub trait Render: Serialize {
    /// `(field, value)` rows for table and pretty output.
    fn rows(&self) -> Vec<(String, String)>;

    /// Single-line form for `--format raw`.
    fn raw(&self) -> String;
}

pub fn emit<T: Render>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, val) in value.rows() {
                table.add_row(vec![field, val]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rows = value.rows();
            let width = rows.iter().map(|(field, _)| field.len()).max().unwrap_or(0);
            for (field, val) in rows {
                println!("{field:<width$}  {val}");
            }
        }
        OutputFormat::Raw => println!("{}", value.raw()),
    }
}

/// Print a list as one table, one JSON line per item, or one raw line per
/// item.
pub fn emit_list<T: Render>(items: &[T], header: &[&str], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header.to_vec());
            for item in items {
                table.add_row(item.rows().into_iter().map(|(_, val)| val));
            }
            println!("{table}");
        }
        _ => {
            for item in items {
                emit(item, format);
            }
        }
    }
}

/// Result of a device action such as save or calibrate.
#[derive(Serialize)]
pub struct ActionOutput {
    action: &'static str,
    outcome: Outcome,
    timestamp: String,
}

impl ActionOutput {
    pub fn new(action: &'static str, outcome: Outcome) -> Self {
        Self {
            action,
            outcome,
            timestamp: now_unix_seconds(),
        }
    }
}

impl Render for ActionOutput {
    fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("action".to_string(), self.action.to_string()),
            ("outcome".to_string(), outcome_label(self.outcome).to_string()),
        ]
    }

    fn raw(&self) -> String {
        outcome_label(self.outcome).to_string()
    }
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ok => "ok",
        Outcome::Adjusted => "adjusted to range",
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_space_separated() {
        assert_eq!(hex(&[0xB0, 0x04, 0x0a]), "b0 04 0a");
        assert_eq!(hex(&[]), "");
    }
}
