//! Conversation export

use std::path::{Path, PathBuf};

use colored::Colorize;

use super::AppContext;
use crate::error::{Result, TeachmateError};
use crate::export::{self, ExportFormat, Transcript};

/// Export a conversation into `output` (the current directory when omitted)
///
/// # Returns
///
/// The path of the written file
pub fn run_export(
    ctx: &AppContext,
    session: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let store = &ctx.store;
    let id = store.resolve_session_id(session)?;
    let session = store
        .session(&id)?
        .ok_or_else(|| TeachmateError::NotFound(format!("session {}", id)))?;
    let messages = store.messages(&id)?;
    if messages.is_empty() {
        println!(
            "{}",
            "Conversation has no messages; exporting an empty transcript.".yellow()
        );
    }

    let transcript = Transcript::new(&session.title, &messages);
    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    let path = export::write_to_dir(format, &transcript, Path::new(&dir))?;

    println!("{}", format!("Exported to {}", path.display()).green());
    if format == ExportFormat::Pdf {
        println!(
            "{}",
            "Open the file in a browser and print it to PDF.".dimmed()
        );
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_context;
    use crate::storage::ChatMessage;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_named_file() {
        let ctx = test_context();
        let session = ctx.store.create_session().unwrap();
        ctx.store
            .rename_session(&session.id, "Giáo án: Hình học")
            .unwrap();
        ctx.store
            .save_messages(
                &session.id,
                &[
                    ChatMessage::user("Soạn giáo án"),
                    ChatMessage::model("**Mục tiêu**"),
                ],
            )
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = run_export(
            &ctx,
            &session.id[..8],
            ExportFormat::Markdown,
            Some(dir.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(path, dir.path().join("Giáo án_ Hình học.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("**Mục tiêu**"));
    }

    #[test]
    fn test_export_unknown_session() {
        let ctx = test_context();
        assert!(run_export(&ctx, "missing", ExportFormat::Word, None).is_err());
    }
}
