//! Interactive chat and one-shot questions

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{print_message, short_id, AppContext};
use crate::assistant::{Assistant, Exchange};
use crate::error::{Result, TeachmateError};
use crate::export::{self, Transcript};
use crate::storage::ChatSession;

/// How many earlier messages to replay when resuming a session
const RESUME_CONTEXT: usize = 4;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `ctx` - Shared command context
/// * `session` - Session id or prefix to resume; a new session otherwise
/// * `model` - Preferred model to remember before starting
pub async fn run_chat(
    ctx: &AppContext,
    session: Option<String>,
    model: Option<String>,
) -> Result<()> {
    if let Some(model) = &model {
        ctx.store.set_selected_model(model)?;
        tracing::info!(model = %model, "Preferred model updated");
    }

    let assistant = ctx.assistant();
    let mut session = open_session(&assistant, session.as_deref())?;
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&assistant, &session)?;

    let earlier = assistant.store().messages(&session.id)?;
    for message in earlier
        .iter()
        .skip(earlier.len().saturating_sub(RESUME_CONTEXT))
    {
        print_message(message);
    }

    loop {
        let prompt = format!("{} ", "teachmate>".bright_blue().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().red());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::Exit => break,
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Regenerate => regenerate_last(&assistant, &session.id).await,
                    SpecialCommand::Documents => print_documents(&assistant, &session.id)?,
                    SpecialCommand::Export { format, dir } => {
                        export_session(&assistant, &session, format, dir.as_deref())?;
                    }
                    SpecialCommand::Bookmark => bookmark_last(&assistant, &session.id)?,
                    SpecialCommand::New => {
                        session = assistant.store().create_session()?;
                        println!(
                            "{}\n",
                            format!("Started new conversation {}", short_id(&session.id)).green()
                        );
                    }
                    SpecialCommand::None => {
                        let exchange = assistant.send(&session.id, trimmed).await?;
                        print_exchange(&exchange);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Tạm biệt!");
    Ok(())
}

/// Ask a single question and print the answer
pub async fn run_ask(ctx: &AppContext, prompt: &str, session: Option<String>) -> Result<()> {
    let assistant = ctx.assistant();
    let session = open_session(&assistant, session.as_deref())?;
    let exchange = assistant.send(&session.id, prompt).await?;
    print_exchange(&exchange);
    println!(
        "{}",
        format!("Conversation {}", short_id(&session.id)).dimmed()
    );
    Ok(())
}

fn open_session(assistant: &Assistant, requested: Option<&str>) -> Result<ChatSession> {
    match requested {
        Some(prefix) => {
            let id = assistant.store().resolve_session_id(prefix)?;
            assistant
                .store()
                .session(&id)?
                .ok_or_else(|| TeachmateError::NotFound(format!("session {}", id)).into())
        }
        None => assistant.store().create_session(),
    }
}

fn export_session(
    assistant: &Assistant,
    session: &ChatSession,
    format: export::ExportFormat,
    dir: Option<&str>,
) -> Result<()> {
    let title = assistant
        .store()
        .session(&session.id)?
        .map(|s| s.title)
        .unwrap_or_else(|| session.title.clone());
    let messages = assistant.store().messages(&session.id)?;
    let transcript = Transcript::new(&title, &messages);
    let dir = std::path::Path::new(dir.unwrap_or("."));
    match export::write_to_dir(format, &transcript, dir) {
        Ok(path) => println!("{}\n", format!("Exported to {}", path.display()).green()),
        Err(e) => eprintln!("{}\n", format!("Export failed: {}", e).red()),
    }
    Ok(())
}

fn print_exchange(exchange: &Exchange) {
    match &exchange.model {
        Some(model) => println!(
            "\n{} {}",
            "🤖 Trợ lý GV".green().bold(),
            format!("({})", model).dimmed()
        ),
        None => println!("\n{}", "🤖 Trợ lý GV".red().bold()),
    }
    println!("{}\n", exchange.reply.text);
}

async fn regenerate_last(assistant: &Assistant, session_id: &str) {
    let last = match assistant.last_reply_id(session_id) {
        Ok(Some(id)) => id,
        Ok(None) => {
            println!("{}\n", "Nothing to regenerate yet.".yellow());
            return;
        }
        Err(e) => {
            eprintln!("{}\n", format!("Error: {}", e).red());
            return;
        }
    };
    match assistant.regenerate(session_id, &last).await {
        Ok(message) => {
            println!("\n{}", "🤖 Trợ lý GV (regenerated)".green().bold());
            println!("{}\n", message.text);
        }
        Err(e) => eprintln!("{}\n", format!("Regenerate failed: {}", e).red()),
    }
}

fn bookmark_last(assistant: &Assistant, session_id: &str) -> Result<()> {
    let store = assistant.store();
    let Some(last) = assistant.last_reply_id(session_id)? else {
        println!("{}\n", "Nothing to bookmark yet.".yellow());
        return Ok(());
    };
    let messages = store.messages(session_id)?;
    let title = store
        .session(session_id)?
        .map(|s| s.title)
        .unwrap_or_default();
    if let Some(message) = messages.iter().find(|m| m.id == last) {
        if store.add_bookmark(session_id, &title, message)? {
            println!("{}\n", "Bookmarked.".green());
        } else {
            println!("{}\n", "Already bookmarked.".yellow());
        }
    }
    Ok(())
}

fn print_documents(assistant: &Assistant, session_id: &str) -> Result<()> {
    let store = assistant.store();
    let selected = store
        .session(session_id)?
        .map(|s| s.selected_doc_ids)
        .unwrap_or_default();
    let documents = store.documents()?;

    if documents.is_empty() {
        println!(
            "{}\n",
            "No documents stored. Add some with `teachmate docs add FILE...`".yellow()
        );
        return Ok(());
    }

    println!();
    for doc in documents {
        let marker = if selected.contains(&doc.id) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "{} {} {} ({})",
            marker,
            short_id(&doc.id).cyan(),
            doc.title,
            doc.file_type
        );
    }
    println!(
        "\n{}\n",
        format!(
            "Select with `teachmate docs select {} ID...`",
            short_id(session_id)
        )
        .dimmed()
    );
    Ok(())
}

fn print_welcome_banner(assistant: &Assistant, session: &ChatSession) -> Result<()> {
    let settings = assistant.settings()?;
    let dark = assistant.store().dark_mode()?.unwrap_or(true);
    let title = if dark {
        "Teachmate - Trợ lý Giáo viên".bright_white().bold()
    } else {
        "Teachmate - Trợ lý Giáo viên".black().bold()
    };

    println!("\n══════════════════════════════════════════════════════════════");
    println!("  {}", title);
    println!("══════════════════════════════════════════════════════════════\n");
    println!(
        "Conversation: {} ({})",
        session.title,
        short_id(&session.id).cyan()
    );
    println!("Model:        {}", settings.preferred_model.cyan());
    println!(
        "Language:     {}",
        crate::prompts::language_label(&assistant.language()?)
    );
    if settings.api_key.is_none() {
        println!(
            "{}",
            "No API key configured. Run `teachmate auth set` first.".yellow()
        );
    }
    println!("\nType '/help' for available commands, '/exit' to quit\n");
    Ok(())
}
