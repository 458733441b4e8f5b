//! Model preference commands
//!
//! The configured model list is the fallback universe. The preferred model
//! is stored in the chat store and tried first on every request.

use colored::Colorize;
use prettytable::{format, row, Table};

use super::AppContext;
use crate::cli::ModelCommand;
use crate::dispatcher::DispatchSettings;
use crate::error::Result;

/// Handle model commands
pub fn handle_models(ctx: &AppContext, command: ModelCommand) -> Result<()> {
    match command {
        ModelCommand::List => {
            let settings = model_order(ctx)?;
            let candidates = settings.candidates();

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.set_titles(row!["Order", "Model", "Status"]);

            for (index, model) in candidates.iter().enumerate() {
                let status = if *model == settings.preferred_model {
                    "preferred".green().to_string()
                } else if settings.models.contains(model) {
                    "fallback".to_string()
                } else {
                    "unlisted".yellow().to_string()
                };
                table.add_row(row![index + 1, model.cyan(), status]);
            }

            println!("\nModels (tried in this order):");
            table.printstd();
            println!();
        }
        ModelCommand::Current => {
            let settings = model_order(ctx)?;
            println!("Preferred model: {}", settings.preferred_model.cyan());
        }
        ModelCommand::Set { model } => {
            let model = model.trim();
            if !ctx.config.provider.models.iter().any(|m| m == model) {
                println!(
                    "{}",
                    format!(
                        "Warning: {} is not in the configured model list; it will be tried first anyway.",
                        model
                    )
                    .yellow()
                );
            }
            ctx.store.set_selected_model(model)?;
            ctx.assistant().invalidate();
            tracing::info!(model = %model, "Preferred model updated");
            println!("{}", format!("Preferred model set to {}", model).green());
        }
    }
    Ok(())
}

/// Candidate order from config and the stored preference; no credential needed
fn model_order(ctx: &AppContext) -> Result<DispatchSettings> {
    Ok(DispatchSettings::from_config(&ctx.config.provider, None, ctx.store.selected_model()?))
}
