use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::SchemaKind;

/// All schemas of `kind` in `namespace`, or just the one called `name`.
pub fn run<C: DocumentClient>(
    client: &C,
    namespace: &str,
    kind: SchemaKind,
    name: Option<&str>,
) -> Result<CmdResult> {
    let document = match name {
        Some(name) => client.schema(namespace, kind, name)?,
        None => client.schemas(namespace, kind)?,
    };
    Ok(CmdResult::default().with_document(document))
}
