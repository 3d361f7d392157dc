use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::errors::StoreError;

/// Largest document kept across runs; bigger ones are rejected, never truncated
pub const MAX_STORED_BYTES: usize = 2 * 1024 * 1024;

const PDF_FILE: &str = "document.pdf";
const METADATA_FILE: &str = "document.json";

/// Local persistence for the document currently being worked on
pub trait DocumentStore {
    fn save(&self, document: &Document) -> Result<(), StoreError>;

    /// The stored document, or `None` when nothing usable is stored
    fn load(&self) -> Option<Document>;

    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredMetadata {
    name: String,
    size: usize,
    text: Option<String>,
    saved_at: DateTime<Utc>,
}

/// Keeps a single document as `document.pdf` next to a `document.json` describing it
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.config/docent/current`
    pub fn default_location() -> Result<Self, StoreError> {
        let home_dir = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::new(
            home_dir.join(".config").join("docent").join("current"),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pdf_path(&self) -> PathBuf {
        self.dir.join(PDF_FILE)
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    fn read(&self) -> Result<Option<Document>, StoreError> {
        let metadata_path = self.metadata_path();
        if !metadata_path.exists() {
            return Ok(None);
        }

        let metadata: StoredMetadata = serde_json::from_slice(&fs::read(metadata_path)?)?;
        let bytes = fs::read(self.pdf_path())?;
        if bytes.len() != metadata.size {
            return Err(StoreError::Corrupted(format!(
                "expected {} bytes, found {}",
                metadata.size,
                bytes.len()
            )));
        }

        let document = Document::from_bytes(metadata.name, bytes)?.with_text(metadata.text);
        Ok(Some(document))
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

impl DocumentStore for FileDocumentStore {
    fn save(&self, document: &Document) -> Result<(), StoreError> {
        if document.size() > MAX_STORED_BYTES {
            // never leave an older document behind to be reopened in its place
            self.clear()?;
            return Err(StoreError::TooLarge {
                size: document.size(),
                limit: MAX_STORED_BYTES,
            });
        }

        fs::create_dir_all(&self.dir)?;
        // metadata goes last so a half-written save never loads
        remove_if_exists(&self.metadata_path())?;
        fs::write(self.pdf_path(), document.bytes())?;

        let metadata = StoredMetadata {
            name: document.name().to_string(),
            size: document.size(),
            text: document.text().map(String::from),
            saved_at: Utc::now(),
        };
        fs::write(self.metadata_path(), serde_json::to_vec_pretty(&metadata)?)?;

        tracing::debug!("Saved {} to {}", document.name(), self.dir.display());
        Ok(())
    }

    fn load(&self) -> Option<Document> {
        match self.read() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Discarding stored document: {}", e);
                if let Err(e) = self.clear() {
                    tracing::warn!("Failed to clear document store: {}", e);
                }
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        remove_if_exists(&self.metadata_path())?;
        remove_if_exists(&self.pdf_path())?;
        Ok(())
    }
}
