use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::{OsdfError, Result};

/// Fetches node `id`, at `version` if given, otherwise the latest version.
pub fn run<C: DocumentClient>(client: &C, id: &str, version: Option<u32>) -> Result<CmdResult> {
    let node = client
        .node(id, version)
        .map_err(|source| OsdfError::NodeUnavailable {
            id: id.to_string(),
            source: Box::new(source),
        })?;
    Ok(CmdResult::default().with_document(node))
}
