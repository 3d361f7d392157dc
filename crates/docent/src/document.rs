use std::panic;
use std::path::Path;

use crate::errors::DocumentError;

/// Largest PDF accepted for loading
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A loaded PDF and, once extracted, its text
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    bytes: Vec<u8>,
    text: Option<String>,
}

impl Document {
    pub fn from_bytes<S: Into<String>>(name: S, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let name = name.into();
        if !is_pdf(&name, &bytes) {
            return Err(DocumentError::NotPdf(name));
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        Ok(Self {
            name,
            bytes,
            text: None,
        })
    }

    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let size = std::fs::metadata(path)?.len();
        if size > MAX_DOCUMENT_BYTES as u64 {
            return Err(DocumentError::TooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(name, bytes)
    }

    /// Attach previously extracted text, e.g. when restoring from a store
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|text| !text.is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The extracted text, if `extract_text` has already run
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Extract and cache the document text.
    ///
    /// Fails with `Parse` when the PDF cannot be read and `Empty` when it holds no text
    /// (scanned pages, for instance).
    pub fn extract_text(&mut self) -> Result<&str, DocumentError> {
        if self.text.is_none() {
            let raw = extract_raw_text(&self.bytes)?;
            let text = normalize_text(&raw);
            if text.is_empty() {
                return Err(DocumentError::Empty);
            }
            tracing::info!("Extracted {} characters from {}", text.len(), self.name);
            self.text = Some(text);
        }

        Ok(self.text.as_deref().unwrap_or_default())
    }
}

/// True for a `.pdf` name or content starting with the PDF header
pub fn is_pdf(name: &str, head: &[u8]) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf") || head.starts_with(PDF_MAGIC)
}

fn extract_raw_text(bytes: &[u8]) -> Result<String, DocumentError> {
    // pdf-extract panics on some malformed files instead of returning an error
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Parse(e.to_string())),
        Err(_) => Err(DocumentError::Parse(
            "the PDF parser aborted on this file".to_string(),
        )),
    }
}

/// Trim every line and collapse runs of blank lines into one, which keeps page and
/// paragraph breaks without the layout padding the extractor produces.
pub fn normalize_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut pending_blank = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            pending_blank = !text.is_empty();
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
            if pending_blank {
                text.push('\n');
            }
        }
        pending_blank = false;
        text.push_str(line);
    }

    text
}
