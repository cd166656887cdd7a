use colored::*;
use osdf::api::{CmdMessage, MessageLevel};
use osdf::error::{OsdfError, Result};
use serde_json::{Map, Value};
use std::io::IsTerminal;

/// Rebuilds `value` with every object's keys in sorted order.
///
/// `serde_json::Map` only sorts while its `preserve_order` feature is off, and any crate in
/// the build can switch that feature on.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Pretty-printed, key-sorted JSON.
pub fn render_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&sort_keys(value))?)
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut output = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.normal(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
        };
        output.push_str(&format!("{}\n", line));
    }
    output
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

pub fn render_error(error: &OsdfError, color: bool) -> String {
    if color {
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

pub fn print_error(error: &OsdfError) {
    eprintln!("{}", render_error(error, std::io::stderr().is_terminal()));
}
