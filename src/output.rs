//! Shared output formatting for taskboard CLI commands.

use serde::Serialize;

use crate::error::{JsonError, Result};
use crate::item::Item;

pub const SCHEMA_VERSION: &str = "taskboard.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable output: a header plus indented detail lines.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    details: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            details: Vec::new(),
        }
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_items<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) {
        for item in items {
            self.details.push(item_line(item));
        }
    }
}

/// One-line rendering of an item for list output.
pub fn item_line(item: &Item) -> String {
    let mut line = format!(
        "[{}] {} {} ({})",
        item.kind(),
        item.id(),
        item.name(),
        item.status()
    );
    if let Some(start) = item.start_time() {
        line.push_str(&format!(
            " {} +{}m",
            start.format("%Y-%m-%d %H:%M"),
            item.duration_minutes()
        ));
    }
    line
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", human.header);
        for detail in &human.details {
            println!("  {}", detail);
        }
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &crate::error::Error, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: JsonError,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: JsonError::from(err),
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    Ok(())
}

/// Best-effort command name for error envelopes, read from the raw args
/// before clap parses them.
pub fn infer_command_name_from_args() -> String {
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .unwrap_or_else(|| "taskboard".to_string())
}
