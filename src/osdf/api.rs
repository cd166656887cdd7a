//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every operation
//! that talks to a server. It dispatches to `commands/*.rs` and returns structured
//! [`CmdResult`]s; it never prints.
//!
//! `OsdfApi<C: DocumentClient>` is generic over the client:
//! - Production: `OsdfApi<HttpClient>`
//! - Testing: `OsdfApi<MemoryClient>`

use crate::client::DocumentClient;
use crate::commands;
use crate::editor::Editor;
use crate::error::Result;
use serde_json::Value;

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};
pub use crate::model::{Query, SchemaKind};

pub struct OsdfApi<C: DocumentClient> {
    client: C,
}

impl<C: DocumentClient> OsdfApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn info(&self) -> Result<CmdResult> {
        commands::info::run(&self.client)
    }

    pub fn cat(&self, id: &str, version: Option<u32>) -> Result<CmdResult> {
        commands::cat::run(&self.client, id, version)
    }

    pub fn insert(&self, node: &Value) -> Result<CmdResult> {
        commands::insert::run(&self.client, node)
    }

    pub fn delete(&self, id: &str) -> Result<CmdResult> {
        commands::delete::run(&self.client, id)
    }

    pub fn query(&self, namespace: &str, query: &Query, all: bool) -> Result<CmdResult> {
        commands::query::run(&self.client, namespace, query, all)
    }

    pub fn schemas(
        &self,
        namespace: &str,
        kind: SchemaKind,
        name: Option<&str>,
    ) -> Result<CmdResult> {
        commands::schemas::run(&self.client, namespace, kind, name)
    }

    pub fn edit<E: Editor>(&self, id: &str, editor: &E) -> Result<CmdResult> {
        commands::edit::run(&self.client, editor, id)
    }
}
