//! Conversation folders

use colored::Colorize;

use super::AppContext;
use crate::cli::FolderCommand;
use crate::error::{Result, TeachmateError};

/// Handle folder commands
pub fn handle_folders(ctx: &AppContext, command: FolderCommand) -> Result<()> {
    let store = &ctx.store;
    match command {
        FolderCommand::List => {
            let folders = store.folders()?;
            if folders.is_empty() {
                println!("{}", "No folders yet.".yellow());
                return Ok(());
            }
            let sessions = store.sessions()?;
            println!("\nFolders:");
            for folder in folders {
                let count = sessions
                    .iter()
                    .filter(|s| s.folder.as_deref() == Some(folder.as_str()))
                    .count();
                println!("  📁 {} {}", folder.cyan(), format!("({})", count).dimmed());
            }
            println!();
        }
        FolderCommand::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(
                    TeachmateError::Storage("Folder name cannot be empty".to_string()).into(),
                );
            }
            store.add_folder(name)?;
            println!("{}", format!("Added folder {}", name).green());
        }
        FolderCommand::Delete { name } => {
            store.delete_folder(name.trim())?;
            println!("{}", format!("Deleted folder {}", name.trim()).green());
        }
    }
    Ok(())
}
