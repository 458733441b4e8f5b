use colored::Colorize;
use prettytable::{format, row, Table};

use super::{print_message, short_id, truncate_title, AppContext};
use crate::cli::HistoryCommand;
use crate::error::Result;

/// Handle history commands
pub fn handle_history(ctx: &AppContext, command: HistoryCommand) -> Result<()> {
    let store = &ctx.store;

    match command {
        HistoryCommand::List { search, folder } => {
            let sessions = store.filtered_sessions(search.as_deref(), folder.as_deref())?;

            if sessions.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(row![
                "ID".bold(),
                "Title".bold(),
                "Folder".bold(),
                "Tags".bold(),
                "Messages".bold(),
                "Created".bold()
            ]);

            for session in sessions {
                let title = truncate_title(&session.title, 40);
                let title = if session.pinned {
                    format!("📌 {}", title)
                } else {
                    title
                };
                let folder = session.folder.clone().unwrap_or_else(|| "-".to_string());
                let tags = session
                    .tags
                    .as_ref()
                    .filter(|t| !t.is_empty())
                    .map(|t| t.join(", "))
                    .unwrap_or_else(|| "-".to_string());
                let count = store.messages(&session.id)?.len();
                let created = session
                    .created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();

                table.add_row(row![
                    short_id(&session.id).cyan(),
                    title,
                    folder,
                    tags,
                    count,
                    created
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to resume a session.",
                "teachmate chat --session <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let id = store.resolve_session_id(&id)?;
            let title = store.session(&id)?.map(|s| s.title).unwrap_or_default();
            let messages = store.messages(&id)?;

            println!("\n{} {}\n", title.bold(), short_id(&id).dimmed());
            if messages.is_empty() {
                println!("{}", "No messages yet.".yellow());
            }
            for message in &messages {
                print_message(message);
            }
        }
        HistoryCommand::Delete { id } => {
            let id = store.resolve_session_id(&id)?;
            store.delete_session(&id)?;
            println!(
                "{}",
                format!("Deleted conversation {}", short_id(&id)).green()
            );
        }
        HistoryCommand::Rename { id, title } => {
            let id = store.resolve_session_id(&id)?;
            let session = store.rename_session(&id, title.trim())?;
            println!("{}", format!("Renamed to \"{}\"", session.title).green());
        }
        HistoryCommand::Pin { id } => {
            let id = store.resolve_session_id(&id)?;
            if store.toggle_pin(&id)? {
                println!("{}", format!("Pinned {}", short_id(&id)).green());
            } else {
                println!("{}", format!("Unpinned {}", short_id(&id)).green());
            }
        }
        HistoryCommand::Folder { id, name } => {
            let id = store.resolve_session_id(&id)?;
            let name = name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            if let Some(name) = &name {
                store.add_folder(name)?;
            }
            store.update_session_folder(&id, name.as_deref())?;
            let notice = match name {
                Some(name) => format!("Moved {} to {}", short_id(&id), name),
                None => format!("Removed {} from its folder", short_id(&id)),
            };
            println!("{}", notice.green());
        }
        HistoryCommand::Tags { id, tags } => {
            let id = store.resolve_session_id(&id)?;
            let tags: Vec<String> = tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            let session = store.update_session_tags(&id, tags)?;
            let shown = session.tags.unwrap_or_default().join(", ");
            println!("{}", format!("Tags: {}", shown).green());
        }
    }

    Ok(())
}
