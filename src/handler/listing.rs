//! Directory listing module

use std::io;
use std::path::Path;
use tokio::fs;

/// Names of the immediate entries of `dir`, one per line
///
/// Order is whatever the filesystem enumerates; subdirectories are listed
/// but never descended into.
pub async fn list_directory(dir: &Path) -> io::Result<String> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names.join("\n"))
}
