use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::Result;
use serde_json::{json, Value};
use tracing::debug;

/// Stores `node` as a new node. The result carries the id the server assigned.
pub fn run<C: DocumentClient>(client: &C, node: &Value) -> Result<CmdResult> {
    let id = client.insert_node(node)?;
    debug!(id = %id, "node created");
    Ok(CmdResult::default().with_document(json!({ "id": id })))
}
