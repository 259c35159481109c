//! Loading of the list of directories to transfer

use anyhow::Context;

/// Read a JSON array of directory names
///
/// Surrounding whitespace of every entry is stripped; order is preserved.
pub async fn load(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed reading directory list from {:?}", path))?;
    parse(&contents).with_context(|| format!("invalid directory list in {:?}", path))
}

pub fn parse(contents: &str) -> anyhow::Result<Vec<String>> {
    let dirs: Vec<String> =
        serde_json::from_str(contents).context("expected a JSON array of directory names")?;
    Ok(dirs.into_iter().map(|d| d.trim().to_string()).collect())
}
