use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::Result;
use tracing::debug;

pub fn run<C: DocumentClient>(client: &C, id: &str) -> Result<CmdResult> {
    client.delete_node(id)?;
    debug!(id, "node deleted");
    Ok(CmdResult::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryClient;
    use serde_json::json;

    #[test]
    fn deletes_silently() {
        let client = MemoryClient::new().with_node("n1", json!({ "id": "n1" }));

        let result = run(&client, "n1").unwrap();

        assert!(result.document.is_none());
        assert!(result.messages.is_empty());
        assert!(client.current("n1").is_none());
    }

    #[test]
    fn deleting_unknown_node_fails() {
        let client = MemoryClient::new();
        assert!(run(&client, "ghost").is_err());
    }
}
