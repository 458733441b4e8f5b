//! Text extraction from reference documents
//!
//! Supported inputs are PDF, Word (`.docx`, `.doc` in OOXML form), and plain
//! text or Markdown. The file extension alone picks the extractor.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, TeachmateError};

/// Text pulled out of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// File name without its extension
    pub title: String,
    /// Lowercased extension
    pub file_type: String,
    /// Size of the source file in bytes
    pub file_size: u64,
    pub text: String,
}

/// Outcome of a batch ingestion
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub documents: Vec<ExtractedDocument>,
    /// Files that failed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

/// Lowercased extension of `path`, or an empty string
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Extract text from a file on disk
///
/// # Errors
///
/// Returns [`TeachmateError::UnsupportedFormat`] for unknown extensions,
/// [`TeachmateError::Io`] when the file cannot be read and
/// [`TeachmateError::Document`] when the content cannot be parsed.
pub fn extract(path: &Path) -> Result<ExtractedDocument> {
    let file_type = file_extension(path);
    if !is_supported(&file_type) {
        return Err(TeachmateError::UnsupportedFormat(file_type).into());
    }

    let bytes = std::fs::read(path).map_err(TeachmateError::Io)?;
    let text = extract_bytes(&file_type, &bytes)?;
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    tracing::debug!(path = %path.display(), chars = text.chars().count(), "Extracted document text");
    Ok(ExtractedDocument {
        title,
        file_type,
        file_size: bytes.len() as u64,
        text,
    })
}

/// Extract every file, continuing past failures
pub fn extract_all(paths: &[PathBuf]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for path in paths {
        match extract(path) {
            Ok(doc) => outcome.documents.push(doc),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping document");
                outcome.failures.push((path.clone(), e.to_string()));
            }
        }
    }
    outcome
}

fn is_supported(ext: &str) -> bool {
    matches!(ext, "pdf" | "docx" | "doc" | "txt" | "md")
}

/// Extract text from raw bytes given a lowercased extension
pub fn extract_bytes(file_type: &str, bytes: &[u8]) -> Result<String> {
    match file_type {
        "pdf" => extract_pdf(bytes),
        "docx" | "doc" => extract_docx(bytes),
        "txt" | "md" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(TeachmateError::UnsupportedFormat(other.to_string()).into()),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| TeachmateError::Document(format!("Failed to read PDF: {}", e)))?;
    Ok(label_pages(&pages))
}

/// Prefix each page with its number, collapsing whitespace inside a page
fn label_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        let page = page.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        out.push_str(&format!("\n--- Trang {} ---\n{}", i + 1, page));
    }
    out.trim().to_string()
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        TeachmateError::Document(format!("Not a Word document package: {}", e))
    })?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| TeachmateError::Document(format!("Missing document body: {}", e)))?
        .read_to_string(&mut xml)?;
    document_xml_text(&xml)
}

/// Paragraph text of a WordprocessingML body, one blank line between paragraphs
pub fn document_xml_text(xml: &str) -> Result<String> {
    let paragraph = Regex::new(r"(?s)<w:p[ >].*?</w:p>")?;
    let run = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br/>")?;

    let paragraphs: Vec<String> = paragraph
        .find_iter(xml)
        .map(|p| {
            run.captures_iter(p.as_str())
                .map(|c| match c.get(1) {
                    Some(text) => unescape_xml(text.as_str()),
                    None if &c[0] == "<w:tab/>" => "\t".to_string(),
                    None => "\n".to_string(),
                })
                .collect::<String>()
        })
        .collect();

    Ok(paragraphs.join("\n\n").trim().to_string())
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Split text into chunks of at most `chunk_size` characters
///
/// A chunk ends after the last newline before the limit, or failing that after
/// the last `". "`, as long as that point is more than half a chunk in.
///
/// # Examples
///
/// ```
/// use teachmate::ingest::split_into_chunks;
///
/// assert_eq!(split_into_chunks("short", 10), vec!["short"]);
/// assert_eq!(split_into_chunks("aaaaa\nbbbbbb", 8), vec!["aaaaa\n", "bbbbbb"]);
/// ```
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = chunk_size.max(2);
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());
        if end < chars.len() {
            let half = start + chunk_size / 2;
            let window = &chars[start..end];
            let last_newline = window.iter().rposition(|&c| c == '\n').map(|i| start + i);
            let last_period = window
                .windows(2)
                .rposition(|w| w == ['.', ' '])
                .map(|i| start + i);

            if let Some(nl) = last_newline.filter(|&nl| nl > half) {
                end = nl + 1;
            } else if let Some(p) = last_period.filter(|&p| p > half) {
                end = p + 2;
            }
        }
        chunks.push(chars[start..end].iter().collect());
        start = end;
    }
    chunks
}
