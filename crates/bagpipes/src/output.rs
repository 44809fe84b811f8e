use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bagpipes_frame::Frame;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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

/// Which way a printed message travelled.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    direction: Direction,
    role: &'a str,
    payload_size: usize,
    armored_size: usize,
    payload: String,
    timestamp: String,
}

pub fn print_message(frame: &Frame, direction: Direction, role: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                direction,
                role,
                payload_size: frame.payload.len(),
                armored_size: frame.armored_len,
                payload: payload_preview(frame.payload.as_ref()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "ROLE", "SIZE", "ARMORED", "PAYLOAD"])
                .add_row(vec![
                    direction.as_str().to_string(),
                    role.to_string(),
                    frame.payload.len().to_string(),
                    frame.armored_len.to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} role={} size={} armored={} payload={}",
                direction.as_str(),
                role,
                frame.payload.len(),
                frame.armored_len,
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(&frame.payload);
            let _ = out.flush();
        }
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
