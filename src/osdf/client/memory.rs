use super::DocumentClient;
use crate::error::{OsdfError, Result};
use crate::model::{Query, QueryPage, SchemaKind, Validation};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// In-memory OSDF server for testing.
///
/// Nodes keep their full version history (version `n` is the `n`th stored document).
/// Every call that matters to the edit and query flows is recorded.
#[derive(Default)]
pub struct MemoryClient {
    info: Value,
    nodes: RefCell<BTreeMap<String, Vec<Value>>>,
    schemas: BTreeMap<(String, SchemaKind), BTreeMap<String, Value>>,
    pages: BTreeMap<String, Vec<Vec<Value>>>,
    rejection: Option<String>,
    fail_edits: bool,
    node_requests: RefCell<Vec<(String, Option<u32>)>>,
    page_requests: RefCell<Vec<(String, u32)>>,
    validations: Cell<usize>,
    edits: Cell<usize>,
}

fn not_found(what: impl Into<String>) -> OsdfError {
    OsdfError::Status {
        status: 404,
        message: format!("{} not found", what.into()),
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }

    /// Stores `node` as the next version of `id`.
    pub fn with_node(self, id: impl Into<String>, node: Value) -> Self {
        self.nodes
            .borrow_mut()
            .entry(id.into())
            .or_default()
            .push(node);
        self
    }

    pub fn with_schema(
        mut self,
        namespace: impl Into<String>,
        kind: SchemaKind,
        name: impl Into<String>,
        schema: Value,
    ) -> Self {
        self.schemas
            .entry((namespace.into(), kind))
            .or_default()
            .insert(name.into(), schema);
        self
    }

    /// Query results for `namespace`, one inner vector per page.
    pub fn with_pages(mut self, namespace: impl Into<String>, pages: Vec<Vec<Value>>) -> Self {
        self.pages.insert(namespace.into(), pages);
        self
    }

    /// Makes every validation fail with `message`.
    pub fn rejecting(mut self, message: impl Into<String>) -> Self {
        self.rejection = Some(message.into());
        self
    }

    /// Makes every `edit_node` call fail as if the server went away.
    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    /// The latest stored version of `id`.
    pub fn current(&self, id: &str) -> Option<Value> {
        self.nodes
            .borrow()
            .get(id)
            .and_then(|versions| versions.last().cloned())
    }

    pub fn node_requests(&self) -> Vec<(String, Option<u32>)> {
        self.node_requests.borrow().clone()
    }

    pub fn page_requests(&self) -> Vec<(String, u32)> {
        self.page_requests.borrow().clone()
    }

    pub fn validations(&self) -> usize {
        self.validations.get()
    }

    pub fn edits(&self) -> usize {
        self.edits.get()
    }
}

impl DocumentClient for MemoryClient {
    fn info(&self) -> Result<Value> {
        Ok(self.info.clone())
    }

    fn node(&self, id: &str, version: Option<u32>) -> Result<Value> {
        self.node_requests
            .borrow_mut()
            .push((id.to_string(), version));

        let nodes = self.nodes.borrow();
        let versions = nodes
            .get(id)
            .ok_or_else(|| not_found(format!("Node {}", id)))?;
        let found = match version {
            Some(v) => versions.get((v as usize).wrapping_sub(1)),
            None => versions.last(),
        };
        found
            .cloned()
            .ok_or_else(|| not_found(format!("Node {} version {:?}", id, version)))
    }

    fn insert_node(&self, node: &Value) -> Result<String> {
        if let Some(message) = &self.rejection {
            return Err(OsdfError::Status {
                status: 422,
                message: message.clone(),
            });
        }

        let mut nodes = self.nodes.borrow_mut();
        let mut serial = nodes.len() + 1;
        while nodes.contains_key(&format!("node{}", serial)) {
            serial += 1;
        }
        let id = format!("node{}", serial);
        nodes.insert(id.clone(), vec![node.clone()]);
        Ok(id)
    }

    fn delete_node(&self, id: &str) -> Result<()> {
        self.nodes
            .borrow_mut()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(format!("Node {}", id)))
    }

    fn validate_node(&self, _node: &Value) -> Result<Validation> {
        self.validations.set(self.validations.get() + 1);
        Ok(match &self.rejection {
            Some(message) => Validation::invalid(message.clone()),
            None => Validation::valid(),
        })
    }

    fn edit_node(&self, id: &str, node: &Value) -> Result<()> {
        self.edits.set(self.edits.get() + 1);
        if self.fail_edits {
            return Err(OsdfError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        let mut nodes = self.nodes.borrow_mut();
        let versions = nodes
            .get_mut(id)
            .ok_or_else(|| not_found(format!("Node {}", id)))?;
        versions.push(node.clone());
        Ok(())
    }

    fn query(&self, namespace: &str, _query: &Query, page: u32) -> Result<QueryPage> {
        self.page_requests
            .borrow_mut()
            .push((namespace.to_string(), page));

        let pages = self.pages.get(namespace).map(Vec::as_slice).unwrap_or(&[]);
        let index = (page as usize).saturating_sub(1);
        let results = pages.get(index).cloned().unwrap_or_default();

        Ok(QueryPage {
            result_count: results.len() as u64,
            results,
            page: Some(page as u64),
            has_more: index + 1 < pages.len(),
        })
    }

    fn schemas(&self, namespace: &str, kind: SchemaKind) -> Result<Value> {
        let all = self
            .schemas
            .get(&(namespace.to_string(), kind))
            .map(|schemas| schemas.clone().into_iter().collect::<Map<String, Value>>())
            .unwrap_or_default();
        Ok(Value::Object(all))
    }

    fn schema(&self, namespace: &str, kind: SchemaKind, name: &str) -> Result<Value> {
        self.schemas
            .get(&(namespace.to_string(), kind))
            .and_then(|schemas| schemas.get(name))
            .cloned()
            .ok_or_else(|| not_found(format!("{} {}", kind, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_version_history() {
        let client = MemoryClient::new()
            .with_node("n1", json!({ "ver": 1 }))
            .with_node("n1", json!({ "ver": 2 }));

        assert_eq!(client.node("n1", None).unwrap(), json!({ "ver": 2 }));
        assert_eq!(client.node("n1", Some(1)).unwrap(), json!({ "ver": 1 }));
        assert!(client.node("n1", Some(0)).is_err());
        assert!(client.node("n1", Some(3)).is_err());
    }

    #[test]
    fn insert_assigns_fresh_ids() {
        let client = MemoryClient::new().with_node("node1", json!({ "ver": 1 }));

        let first = client.insert_node(&json!({ "node_type": "subject" })).unwrap();
        let second = client.insert_node(&json!({ "node_type": "sample" })).unwrap();

        assert_ne!(first, "node1");
        assert_ne!(first, second);
        assert_eq!(client.current(&first).unwrap()["node_type"], "subject");
        assert_eq!(client.node(&second, Some(1)).unwrap()["node_type"], "sample");
        assert_eq!(client.current("node1").unwrap(), json!({ "ver": 1 }));
    }

    #[test]
    fn insert_is_refused_when_rejecting() {
        let client = MemoryClient::new().rejecting("missing linkage");

        match client.insert_node(&json!({})).unwrap_err() {
            OsdfError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "missing linkage");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(client.current("node1").is_none());
    }

    #[test]
    fn walks_all_pages() {
        let client = MemoryClient::new().with_pages(
            "test",
            vec![vec![json!(1), json!(2)], vec![json!(3)], vec![json!(4)]],
        );

        let all = client.query_all("test", &Query::oql("q")).unwrap();
        assert_eq!(all.results, vec![json!(1), json!(2), json!(3), json!(4)]);
        assert_eq!(all.result_count, 4);
        assert_eq!(all.page, None);
        assert_eq!(
            client.page_requests(),
            vec![("test".into(), 1), ("test".into(), 2), ("test".into(), 3)]
        );
    }

    #[test]
    fn stops_paging_on_empty_page() {
        let client = MemoryClient::new().with_pages("test", vec![vec![json!(1)], vec![], vec![json!(3)]]);

        let all = client.query_all("test", &Query::oql("q")).unwrap();
        assert_eq!(all.results, vec![json!(1)]);
        assert_eq!(client.page_requests().len(), 2);
    }

    #[test]
    fn query_all_on_empty_namespace() {
        let client = MemoryClient::new();
        let all = client.query_all("nothing", &Query::oql("q")).unwrap();
        assert!(all.results.is_empty());
        assert_eq!(all.result_count, 0);
    }

    #[test]
    fn schema_lookup_separates_kinds() {
        let client = MemoryClient::new()
            .with_schema("ns", SchemaKind::Base, "project", json!({ "title": "project" }))
            .with_schema("ns", SchemaKind::Aux, "tags", json!({ "type": "array" }));

        assert!(client.schema("ns", SchemaKind::Base, "tags").is_err());
        assert_eq!(
            client.schemas("ns", SchemaKind::Aux).unwrap(),
            json!({ "tags": { "type": "array" } })
        );
    }
}
