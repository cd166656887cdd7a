use crate::error::{OsdfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A query against a namespace, in one of the two languages the server speaks.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// OSDF's native query language, sent as plain text.
    Oql(String),
    /// Search-engine query DSL, sent as a JSON document.
    Dsl(Value),
}

impl Query {
    pub fn oql(text: impl Into<String>) -> Self {
        Query::Oql(text.into())
    }

    /// Parses query-DSL text. The text must be a JSON document.
    pub fn dsl(text: &str) -> Result<Self> {
        let value = serde_json::from_str(text).map_err(OsdfError::InvalidQuery)?;
        Ok(Query::Dsl(value))
    }
}

/// One page of query results as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub result_count: u64,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// The server advertised another page after this one.
    #[serde(skip)]
    pub has_more: bool,
}

impl QueryPage {
    /// Builds the aggregate of several pages: no page number, count equal to the results.
    pub fn aggregate(results: Vec<Value>) -> Self {
        Self {
            result_count: results.len() as u64,
            results,
            page: None,
            has_more: false,
        }
    }
}

/// Which family of schema definitions to address in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaKind {
    Base,
    Aux,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Base => write!(f, "schema"),
            SchemaKind::Aux => write!(f, "auxiliary schema"),
        }
    }
}

/// The server's verdict on a candidate node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dsl_query_must_be_json() {
        let query = Query::dsl(r#"{ "term": { "node_type": "project" } }"#).unwrap();
        assert_eq!(
            query,
            Query::Dsl(json!({ "term": { "node_type": "project" } }))
        );

        let err = Query::dsl("node_type:project").unwrap_err();
        assert!(matches!(err, OsdfError::InvalidQuery(_)));
    }

    #[test]
    fn query_page_reads_server_shape() {
        let page: QueryPage = serde_json::from_value(json!({
            "result_count": 2,
            "page": 1,
            "results": [{ "id": "a" }, { "id": "b" }]
        }))
        .unwrap();
        assert_eq!(page.result_count, 2);
        assert_eq!(page.page, Some(1));
        assert!(!page.has_more);
    }

    #[test]
    fn aggregate_drops_page_number() {
        let page = QueryPage::aggregate(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(page.result_count, 3);
        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("page").is_none());
    }
}
