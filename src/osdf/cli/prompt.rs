//! Interactive prompts for `osdf init`.
//!
//! Every prompt returns `Ok(None)` when the user interrupts (Ctrl-C) or cancels (Esc), so
//! the caller can abort before anything is written.

use inquire::error::InquireError;
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Text};
use osdf::config::{Credentials, DEFAULT_PORT};
use osdf::error::{OsdfError, Result};
use std::path::Path;

fn answered<T>(outcome: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Ok(None)
        }
        Err(e) => Err(OsdfError::Prompt(e.to_string())),
    }
}

fn required(label: &str, help: &str) -> Result<Option<String>> {
    let outcome = Text::new(label)
        .with_help_message(help)
        .with_validator(|input: &str| {
            Ok(if input.trim().is_empty() {
                Validation::Invalid("A value is required.".into())
            } else {
                Validation::Valid
            })
        })
        .prompt();
    Ok(answered(outcome)?.map(|value| value.trim().to_string()))
}

pub fn confirm_overwrite(path: &Path) -> Result<Option<bool>> {
    let question = format!(
        "A credential file already exists at {}. Overwrite it?",
        path.display()
    );
    answered(Confirm::new(&question).with_default(false).prompt())
}

/// Asks for everything that goes into the credential file. The password is masked and
/// must be typed twice.
pub fn ask_credentials() -> Result<Option<Credentials>> {
    let Some(server) = required("Server:", "Host name of the OSDF server")? else {
        return Ok(None);
    };

    let port = CustomType::<u16>::new("Port:")
        .with_default(DEFAULT_PORT)
        .with_error_message("Please enter a port number between 0 and 65535")
        .prompt();
    let Some(port) = answered(port)? else {
        return Ok(None);
    };

    let Some(username) = required("Username:", "Account on the OSDF server")? else {
        return Ok(None);
    };

    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_custom_confirmation_message("Confirm password:")
        .with_custom_confirmation_error_message("The passwords don't match.")
        .prompt();
    let Some(password) = answered(password)? else {
        return Ok(None);
    };

    let ssl = Confirm::new("Use SSL (https)?").with_default(false).prompt();
    let Some(ssl) = answered(ssl)? else {
        return Ok(None);
    };

    Ok(Some(Credentials::new(server, port, username, password, ssl)))
}
