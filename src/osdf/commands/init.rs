use crate::commands::{CmdMessage, CmdResult};
use crate::config::Credentials;
use crate::error::Result;
use std::path::Path;

/// Writes `credentials` to `path`. An existing file is only replaced when `overwrite` is set.
pub fn run(path: &Path, credentials: &Credentials, overwrite: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if path.exists() && !overwrite {
        result.add_message(CmdMessage::warning(format!(
            "Credential file {} already exists; left untouched.",
            path.display()
        )));
        return Ok(result);
    }

    credentials.save(path)?;
    result.add_message(CmdMessage::success(format!(
        "Credentials saved to {}",
        path.display()
    )));
    Ok(result)
}
