use crate::error::CliError;
use serde::Serialize;
use std::path::Path;

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
