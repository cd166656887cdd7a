use crate::client::DocumentClient;
use crate::commands::CmdResult;
use crate::error::Result;

pub fn run<C: DocumentClient>(client: &C) -> Result<CmdResult> {
    let info = client.info()?;
    Ok(CmdResult::default().with_document(info))
}
