//! # Client Layer
//!
//! [`DocumentClient`] is the seam between osdf and an OSDF server. Every call is
//! synchronous and maps one-to-one onto a server endpoint; the only logic on this side
//! of the wire is walking result pages for the `--all` queries.
//!
//! ## Implementations
//!
//! - [`http::HttpClient`]: talks to a real server over HTTP(S) with basic auth
//! - [`memory::MemoryClient`]: canned nodes and pages for tests, with call recording

use crate::error::Result;
use crate::model::{Query, QueryPage, SchemaKind, Validation};
use serde_json::Value;
use tracing::debug;

pub mod http;
pub mod memory;

pub trait DocumentClient {
    /// Server metadata (title, description, contacts).
    fn info(&self) -> Result<Value>;

    /// Fetch a node, at a specific version when one is given.
    fn node(&self, id: &str, version: Option<u32>) -> Result<Value>;

    /// Store a new node and return the id the server assigned to it.
    fn insert_node(&self, node: &Value) -> Result<String>;

    fn delete_node(&self, id: &str) -> Result<()>;

    /// Ask the server whether `node` would be accepted, without storing it.
    fn validate_node(&self, node: &Value) -> Result<Validation>;

    /// Replace node `id` with `node`.
    fn edit_node(&self, id: &str, node: &Value) -> Result<()>;

    /// Fetch one page (1-based) of query results.
    fn query(&self, namespace: &str, query: &Query, page: u32) -> Result<QueryPage>;

    fn schemas(&self, namespace: &str, kind: SchemaKind) -> Result<Value>;

    fn schema(&self, namespace: &str, kind: SchemaKind, name: &str) -> Result<Value>;

    /// Fetch every page of a query and concatenate the results.
    fn query_all(&self, namespace: &str, query: &Query) -> Result<QueryPage> {
        let mut results = Vec::new();
        let mut page = 1;

        loop {
            let current = self.query(namespace, query, page)?;
            debug!(
                namespace,
                page,
                count = current.results.len(),
                more = current.has_more,
                "fetched result page"
            );
            let done = current.results.is_empty() || !current.has_more;
            results.extend(current.results);
            if done {
                break;
            }
            page += 1;
        }

        Ok(QueryPage::aggregate(results))
    }
}
