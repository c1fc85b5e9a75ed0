//! Document loading for `.pdf` and `.txt` inputs.
//!
//! PDF pages are extracted one by one and each page's text is followed by a
//! newline. Text files must be UTF-8. Every other extension is rejected.

use std::path::Path;

use crate::models::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the kind from the file extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ext.eq_ignore_ascii_case("pdf") {
            Ok(DocumentKind::Pdf)
        } else if ext.eq_ignore_ascii_case("txt") {
            Ok(DocumentKind::Text)
        } else {
            Err(ExtractError::UnsupportedFileType(path.display().to_string()))
        }
    }
}

/// Extraction failure. The ingestion orchestrator turns these into
/// `error` outcomes; nothing here panics.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}. Only .txt and .pdf are supported for ingestion.")]
    UnsupportedFileType(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Read and extract the document at `path`.
pub fn load_document(path: &Path) -> Result<Document, ExtractError> {
    let kind = DocumentKind::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (text, page_count) = extract_bytes(&bytes, kind)?;

    Ok(Document {
        source_file,
        text,
        page_count,
    })
}

/// Extract text from in-memory bytes. Returns the text and the page count
/// (1 for text files).
pub fn extract_bytes(bytes: &[u8], kind: DocumentKind) -> Result<(String, usize), ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Text => Ok((String::from_utf8(bytes.to_vec())?, 1)),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<(String, usize), ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut text = String::new();
    for page in &pages {
        text.push_str(page);
        text.push('\n');
    }
    Ok((text, pages.len()))
}
