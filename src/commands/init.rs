use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json` with the default
/// list of salespeople.
///
/// # Arguments
/// - `contacts_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/contacts`
///
/// # Errors
/// - Returns an error if the directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(contacts_home: &Path) -> Result<Out<()>> {
    let config = Config::create(contacts_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the contacts directory at {}",
        config.root().display()
    )
    .into())
}
