use anyhow::{Context, Result};
use docent::document::Document;
use std::path::Path;

pub fn execute(path: &Path) -> Result<()> {
    let mut document =
        Document::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let text = document
        .extract_text()
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;
    println!("{}", text);
    Ok(())
}
