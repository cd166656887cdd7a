use crate::error::{OsdfError, Result};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub const DEFAULT_EDITOR: &str = "vim";

/// Something that lets a user change a file in place and returns when they are done.
pub trait Editor {
    fn edit(&self, path: &Path) -> Result<()>;
}

/// An external editor program, run as a blocking subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    /// Splits an editor command such as `code --wait` into program and arguments, honoring
    /// shell quoting (`"/opt/My Editor/bin/edit" --wait`). A blank command falls back to
    /// [`DEFAULT_EDITOR`].
    pub fn from_command(command: &str) -> Result<Self> {
        let mut parts = shell_words::split(command)
            .map_err(|e| OsdfError::Editor(format!("Cannot parse editor '{}': {}", command, e)))?
            .into_iter();
        Ok(match parts.next() {
            Some(program) => Self {
                program,
                args: parts.collect(),
            },
            None => Self {
                program: DEFAULT_EDITOR.to_string(),
                args: Vec::new(),
            },
        })
    }

    /// Uses `$EDITOR`, or [`DEFAULT_EDITOR`] when it is unset or empty.
    pub fn from_env() -> Result<Self> {
        let command = env::var("EDITOR").unwrap_or_default();
        Self::from_command(&command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        debug!(editor = %self.program, path = %path.display(), "launching editor");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|e| {
                OsdfError::Editor(format!("Failed to launch editor '{}': {}", self.program, e))
            })?;

        if !status.success() {
            return Err(OsdfError::Editor(format!(
                "Editor '{}' exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Writes `document` as indented JSON to a private temporary file, lets `editor` loose on
/// it and returns whatever the file holds afterwards. The file is removed on return.
pub fn edit_json<E: Editor>(editor: &E, document: &Value) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("osdf-")
        .suffix(".json")
        .tempfile()?;

    let buffer = serde_json::to_string_pretty(document)?;
    file.write_all(buffer.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;

    editor.edit(file.path())?;

    Ok(fs::read_to_string(file.path())?)
}
