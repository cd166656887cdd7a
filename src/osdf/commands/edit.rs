//! Interactive node editing.
//!
//! The stages run strictly in order: fetch, edit in an external editor, reparse, diff,
//! validate, submit. Validation always happens before submission, so a rejected or
//! malformed edit never reaches the server as an update. A failed submission is
//! reported and not retried.

use crate::client::DocumentClient;
use crate::commands::{CmdMessage, CmdResult};
use crate::diff::diff;
use crate::editor::{edit_json, Editor};
use crate::error::{OsdfError, Result};
use serde_json::Value;
use tracing::debug;

pub const NO_EDITS: &str = "No edits detected.";
pub const DONE: &str = "Done.";
const REJECTED_WITHOUT_REASON: &str = "Node failed validation.";

pub fn run<C: DocumentClient, E: Editor>(client: &C, editor: &E, id: &str) -> Result<CmdResult> {
    let original = client
        .node(id, None)
        .map_err(|source| OsdfError::NodeUnavailable {
            id: id.to_string(),
            source: Box::new(source),
        })?;

    let buffer = edit_json(editor, &original)?;
    let edited: Value = serde_json::from_str(&buffer).map_err(OsdfError::MalformedEdit)?;

    let changes = diff(&original, &edited);
    if changes.is_empty() {
        return Ok(CmdResult::default().with_message(CmdMessage::info(NO_EDITS)));
    }
    for change in &changes {
        debug!(id, %change, "edited");
    }

    let validation = client.validate_node(&edited)?;
    if !validation.valid {
        let reason = validation
            .error
            .unwrap_or_else(|| REJECTED_WITHOUT_REASON.to_string());
        return Err(OsdfError::ValidationFailed(reason));
    }

    client
        .edit_node(id, &edited)
        .map_err(|source| OsdfError::SaveFailed {
            id: id.to_string(),
            source: Box::new(source),
        })?;

    Ok(CmdResult::default().with_message(CmdMessage::success(DONE)))
}
