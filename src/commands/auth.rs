//! API key management

use colored::Colorize;
use rustyline::DefaultEditor;

use super::AppContext;
use crate::cli::AuthCommand;
use crate::credentials::{mask_key, API_KEY_ENV};
use crate::error::{Result, TeachmateError};

/// Handle auth commands
pub fn handle_auth(ctx: &AppContext, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Set { key } => {
            let key = match key {
                Some(key) => key,
                None => prompt_for_key()?,
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(TeachmateError::CredentialMissing.into());
            }
            ctx.credentials.set_api_key(key)?;
            tracing::info!("API key stored");
            println!("{}", format!("Saved API key {}", mask_key(key)).green());
        }
        AuthCommand::Clear => {
            ctx.credentials.clear_api_key()?;
            println!("{}", "API key removed.".green());
        }
        AuthCommand::Status => match ctx.credentials.api_key() {
            Err(e) => println!(
                "{}",
                format!("Could not read the stored API key: {}", e).yellow()
            ),
            Ok(Some(key)) => {
                println!("API key: {}", mask_key(&key).cyan());
                if std::env::var(API_KEY_ENV).is_ok() {
                    println!("{}", format!("(from {})", API_KEY_ENV).dimmed());
                }
            }
            Ok(None) => println!(
                "{}",
                "No API key configured. Run `teachmate auth set`.".yellow()
            ),
        },
    }
    Ok(())
}

fn prompt_for_key() -> Result<String> {
    let mut rl = DefaultEditor::new()?;
    let key = rl.readline("API key: ")?;
    Ok(key)
}
