//! Bookmarked messages

use colored::Colorize;

use super::{resolve_message, short_id, truncate_title, AppContext};
use crate::cli::BookmarkCommand;
use crate::error::{Result, TeachmateError};
use crate::storage::ChatMessage;

/// Handle bookmark commands
pub fn handle_bookmarks(ctx: &AppContext, command: BookmarkCommand) -> Result<()> {
    let store = &ctx.store;
    match command {
        BookmarkCommand::List => {
            let bookmarks = store.bookmarks()?;
            if bookmarks.is_empty() {
                println!("{}", "No bookmarks yet.".yellow());
                return Ok(());
            }
            println!();
            for bookmark in bookmarks {
                let saved = bookmark
                    .bookmarked_at
                    .with_timezone(&chrono::Local)
                    .format("%d/%m/%Y %H:%M");
                println!(
                    "🔖 {} {} {}",
                    short_id(&bookmark.message.id).cyan(),
                    truncate_title(&bookmark.session_title, 40).bold(),
                    format!("({})", saved).dimmed()
                );
                println!("{}\n", preview(&bookmark.message.text));
            }
        }
        BookmarkCommand::Add { session, message } => {
            let session_id = store.resolve_session_id(&session)?;
            let title = store
                .session(&session_id)?
                .map(|s| s.title)
                .unwrap_or_default();
            let messages = store.messages(&session_id)?;
            let message = resolve_message(&messages, &message)?;
            if store.add_bookmark(&session_id, &title, message)? {
                println!(
                    "{}",
                    format!("Bookmarked {}", short_id(&message.id)).green()
                );
            } else {
                println!("{}", "Already bookmarked.".yellow());
            }
        }
        BookmarkCommand::Remove { message } => {
            let bookmarked: Vec<ChatMessage> =
                store.bookmarks()?.into_iter().map(|b| b.message).collect();
            let id = resolve_message(&bookmarked, &message)
                .map_err(|_| TeachmateError::NotFound(format!("bookmark {}", message)))?
                .id
                .clone();
            store.remove_bookmark(&id)?;
            println!("{}", format!("Removed bookmark {}", short_id(&id)).green());
        }
    }
    Ok(())
}

fn preview(text: &str) -> String {
    let first = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    truncate_title(first.trim(), 100)
}
