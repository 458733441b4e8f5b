//! Conversation export
//!
//! Renders a session to Markdown, a Word document, or a print-ready HTML page
//! that the browser's print dialog turns into a PDF.

pub mod docx;
pub mod html;
pub mod markdown;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{FixedOffset, Local, NaiveDate};

use crate::error::{Result, TeachmateError};
use crate::storage::{ChatMessage, Role};

/// Longest file name stem produced by [`sanitize_filename`]
pub const MAX_FILENAME_CHARS: usize = 100;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Markdown text
    Markdown,
    /// Word (.docx)
    Word,
    /// Print-ready HTML for saving as PDF
    Pdf,
}

impl ExportFormat {
    /// File extension of the rendered output
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Word => "docx",
            ExportFormat::Pdf => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = TeachmateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "word" | "docx" => Ok(ExportFormat::Word),
            "pdf" | "html" => Ok(ExportFormat::Pdf),
            other => Err(TeachmateError::Export(format!(
                "Unknown export format '{}'. Use markdown, word or pdf.",
                other
            ))),
        }
    }
}

/// A conversation ready to be rendered
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    pub title: &'a str,
    pub messages: &'a [ChatMessage],
    /// Date printed in the header
    pub exported_on: NaiveDate,
    /// Offset used for message times
    pub offset: FixedOffset,
}

impl<'a> Transcript<'a> {
    /// Transcript dated today in the local time zone
    pub fn new(title: &'a str, messages: &'a [ChatMessage]) -> Self {
        let now = Local::now();
        Self {
            title,
            messages,
            exported_on: now.date_naive(),
            offset: *now.offset(),
        }
    }

    /// Export date as `dd/mm/yyyy`
    pub fn date_label(&self) -> String {
        self.exported_on.format("%d/%m/%Y").to_string()
    }

    /// Message time as `HH:MM`
    pub fn time_label(&self, message: &ChatMessage) -> String {
        message
            .timestamp
            .with_timezone(&self.offset)
            .format("%H:%M")
            .to_string()
    }

    /// Speaker heading without markup, e.g. `👤 Bạn (09:30)`
    pub fn speaker_label(&self, message: &ChatMessage) -> String {
        let who = match message.role {
            Role::User => "👤 Bạn",
            Role::Model => "🤖 Trợ lý GV",
        };
        format!("{} ({})", who, self.time_label(message))
    }
}

/// Render a transcript in the given format
pub fn render(format: ExportFormat, transcript: &Transcript<'_>) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Markdown => Ok(markdown::render(transcript).into_bytes()),
        ExportFormat::Word => docx::render(transcript),
        ExportFormat::Pdf => html::render(transcript).map(String::into_bytes),
    }
}

/// Render a transcript and write it into `dir`
///
/// # Returns
///
/// The path of the written file, named after the sanitized title
pub fn write_to_dir(
    format: ExportFormat,
    transcript: &Transcript<'_>,
    dir: &Path,
) -> Result<PathBuf> {
    let bytes = render(format, transcript)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{}.{}",
        sanitize_filename(transcript.title),
        format.extension()
    ));
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), ?format, "Exported conversation");
    Ok(path)
}

/// Replaces characters that are invalid in file names and caps the length
///
/// # Examples
///
/// ```
/// use teachmate::export::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Đề: Toán 6/7?"), "Đề_ Toán 6_7_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Splits `text` into `(segment, bold)` runs on `**` markers
///
/// Unterminated markers are kept as literal text.
pub(crate) fn inline_bold_runs(text: &str) -> Vec<(String, bool)> {
    let mut runs = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        match after.find("**") {
            Some(close) => {
                if open > 0 {
                    runs.push((rest[..open].to_string(), false));
                }
                runs.push((after[..close].to_string(), true));
                rest = &after[close + 2..];
            }
            None => break,
        }
    }
    if !rest.is_empty() {
        runs.push((rest.to_string(), false));
    }
    if runs.is_empty() {
        runs.push((text.to_string(), false));
    }
    runs
}
