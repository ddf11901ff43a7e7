//! Bulk-ingestion readers: turn files into `(content, metadata)` pairs.
//!
//! These are the only entry points in the retrieval crates that surface I/O
//! errors to the caller; an unreadable path is a caller mistake the CLI
//! should report, not something to degrade around.

use anyhow::{Context, Result};
use cityqa_core::types::Metadata;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Whole file as one document: `source` = file name, `type` = "text".
pub fn text_file_entry(path: &Path) -> Result<(String, Metadata)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read text file {}", path.display()))?;
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), Value::from(file_name(path)));
    metadata.insert("type".to_string(), Value::from("text"));
    Ok((content, metadata))
}

/// One entry per non-blank PDF page: `source` = file name, `page` = 1-based
/// page number, `type` = "pdf". Blank pages are skipped.
pub fn pdf_entries(path: &Path) -> Result<Vec<(String, Metadata)>> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .with_context(|| format!("extract text from {}", path.display()))?;
    let mut entries = Vec::new();
    for (index, text) in pages.into_iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), Value::from(file_name(path)));
        metadata.insert("page".to_string(), Value::from(index + 1));
        metadata.insert("type".to_string(), Value::from("pdf"));
        entries.push((text, metadata));
    }
    Ok(entries)
}

/// All `.txt`/`.md` files under `dir`, sorted for a deterministic ingest
/// order.
pub fn directory_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.path().extension().and_then(|e| e.to_str()) {
            Some("txt") | Some("md") => files.push(entry.into_path()),
            _ => {}
        }
    }
    files.sort();
    Ok(files)
}
