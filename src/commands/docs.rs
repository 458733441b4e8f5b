//! Reference document commands
//!
//! Documents are extracted once, stored with their text, and attached to a
//! conversation with `docs select`. Selected documents are sent as context
//! with every question in that conversation.

use colored::Colorize;
use prettytable::{format, row, Table};

use super::{short_id, truncate_title, AppContext};
use crate::cli::DocsCommand;
use crate::error::{Result, TeachmateError};
use crate::ingest;
use crate::storage::NewDocument;

/// Handle document commands
pub fn handle_docs(ctx: &AppContext, command: DocsCommand) -> Result<()> {
    let store = &ctx.store;
    match command {
        DocsCommand::Add { files, tag, folder } => {
            let outcome = ingest::extract_all(&files);
            let tags = clean_tags(tag);
            let folder = folder.map(|f| f.trim().to_string()).unwrap_or_default();

            for doc in outcome.documents {
                let stored = store.save_document(
                    NewDocument {
                        title: doc.title,
                        file_type: doc.file_type,
                        file_size: doc.file_size,
                        content: doc.text,
                        tags: tags.clone(),
                        folder: folder.clone(),
                    },
                    ctx.config.documents.chunk_size,
                    ctx.config.documents.max_stored_chars,
                )?;
                println!(
                    "{} {} {}",
                    "✓".green(),
                    stored.title,
                    format!("({}, {} chunks)", short_id(&stored.id), stored.chunk_count).dimmed()
                );
            }

            for (path, error) in &outcome.failures {
                eprintln!("{} {}: {}", "✗".red(), path.display(), error);
            }
            if !outcome.failures.is_empty() {
                tracing::warn!(
                    failed = outcome.failures.len(),
                    "Some documents could not be read"
                );
            }
        }
        DocsCommand::List => {
            let documents = store.documents()?;
            if documents.is_empty() {
                println!("{}", "No reference documents stored.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(row![
                "ID".bold(),
                "Title".bold(),
                "Type".bold(),
                "Size".bold(),
                "Chunks".bold(),
                "Tags".bold(),
                "Folder".bold(),
                "Added".bold()
            ]);
            for doc in documents {
                let folder = if doc.folder.is_empty() {
                    "-".to_string()
                } else {
                    doc.folder
                };
                let tags = if doc.tags.is_empty() {
                    "-".to_string()
                } else {
                    doc.tags.join(", ")
                };
                table.add_row(row![
                    short_id(&doc.id).cyan(),
                    truncate_title(&doc.title, 40),
                    doc.file_type.to_uppercase(),
                    format_size(doc.file_size),
                    doc.chunk_count,
                    tags,
                    folder,
                    doc.created_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d")
                        .to_string()
                ]);
            }
            println!("\nReference documents:");
            table.printstd();
            println!();
        }
        DocsCommand::Show { id } => {
            let id = store.resolve_document_id(&id)?;
            let content = store
                .document_content(&id)?
                .ok_or_else(|| TeachmateError::NotFound(format!("document {}", id)))?;
            println!("{}", content);
        }
        DocsCommand::Remove { id } => {
            let id = store.resolve_document_id(&id)?;
            store.delete_document(&id)?;
            println!("{}", format!("Removed document {}", short_id(&id)).green());
        }
        DocsCommand::Select { session, ids } => {
            let session_id = store.resolve_session_id(&session)?;
            let mut resolved: Vec<String> = Vec::with_capacity(ids.len());
            for id in &ids {
                let id = store.resolve_document_id(id)?;
                if !resolved.contains(&id) {
                    resolved.push(id);
                }
            }
            let count = resolved.len();
            store.set_session_documents(&session_id, resolved)?;
            if count == 0 {
                println!("{}", "Cleared document selection.".green());
            } else {
                println!(
                    "{}",
                    format!(
                        "Attached {} document(s) to {}",
                        count,
                        short_id(&session_id)
                    )
                    .green()
                );
            }
        }
        DocsCommand::Tag { id, tags } => {
            let id = store.resolve_document_id(&id)?;
            store.update_document_tags(&id, clean_tags(tags))?;
            println!("{}", format!("Updated tags for {}", short_id(&id)).green());
        }
        DocsCommand::Move { id, folder } => {
            let id = store.resolve_document_id(&id)?;
            store.update_document_folder(&id, folder.trim())?;
            println!(
                "{}",
                format!("Moved {} to {}", short_id(&id), folder.trim()).green()
            );
        }
    }
    Ok(())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
