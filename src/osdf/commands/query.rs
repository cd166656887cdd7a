use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Query;

const FIRST_PAGE: u32 = 1;

/// Runs `query` in `namespace`: the first page only, or every page merged when `all` is set.
pub fn run<C: DocumentClient>(
    client: &C,
    namespace: &str,
    query: &Query,
    all: bool,
) -> Result<CmdResult> {
    let results = if all {
        client.query_all(namespace, query)?
    } else {
        client.query(namespace, query, FIRST_PAGE)?
    };
    let document = serde_json::to_value(&results)?;
    Ok(CmdResult::default().with_document(document))
}
