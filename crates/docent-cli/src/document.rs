use anyhow::{bail, Context, Result};
use docent::document::Document;
use docent::store::DocumentStore;
use std::path::Path;

#[derive(Debug, PartialEq)]
pub enum SaveStatus {
    Saved,
    /// Loaded from the store and already complete there
    Unchanged,
    /// Kept for this run only, with the reason it could not be stored
    Skipped(String),
}

/// What to do when no text can be extracted from the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Fail the command
    Required,
    /// Carry on without document text, the failure is reported in `Loaded::warning`
    Optional,
}

#[derive(Debug)]
pub struct Loaded {
    pub document: Document,
    pub status: SaveStatus,
    pub warning: Option<String>,
}

/// Open the PDF at `path`, or the stored one when no path is given, and extract its
/// text. Newly opened or newly extracted documents are written back to the store.
pub fn load(
    path: Option<&Path>,
    store: &impl DocumentStore,
    extraction: Extraction,
) -> Result<Loaded> {
    let mut document = match path {
        Some(path) => {
            Document::open(path).with_context(|| format!("Failed to open {}", path.display()))?
        }
        None => match store.load() {
            Some(document) => document,
            None => bail!("No document loaded yet, pass the path of a PDF"),
        },
    };

    let name = document.name().to_string();
    let already_extracted = document.text().is_some();
    let mut warning = None;
    if !already_extracted {
        if let Err(e) = document.extract_text() {
            match extraction {
                Extraction::Required => {
                    return Err(e).with_context(|| format!("Failed to extract text from {}", name))
                }
                Extraction::Optional => {
                    tracing::warn!("Continuing without text for {}: {}", name, e);
                    warning = Some(format!("No text could be read from {}: {}", name, e));
                }
            }
        }
    }

    let newly_extracted = !already_extracted && document.text().is_some();
    let status = if path.is_none() && !newly_extracted {
        SaveStatus::Unchanged
    } else {
        match store.save(&document) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::warn!("Not keeping {} for later: {}", name, e);
                SaveStatus::Skipped(e.to_string())
            }
        }
    };

    Ok(Loaded {
        document,
        status,
        warning,
    })
}
