//! Teachmate - teaching assistant CLI
//!
//! Main entry point for the Teachmate application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use teachmate::cli::{Cli, Commands};
use teachmate::commands;
use teachmate::commands::settings::SettingsUpdate;
use teachmate::commands::AppContext;
use teachmate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let ctx = AppContext::open(config)?;

    match cli.command {
        Commands::Chat { session, model } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(s) = &session {
                tracing::debug!("Resuming conversation: {}", s);
            }
            commands::chat::run_chat(&ctx, session, model).await
        }
        Commands::Ask { prompt, session } => {
            commands::chat::run_ask(&ctx, &prompt, session).await
        }
        Commands::Auth { command } => commands::auth::handle_auth(&ctx, command),
        Commands::Models { command } => commands::models::handle_models(&ctx, command),
        Commands::History { command } => commands::history::handle_history(&ctx, command),
        Commands::Folders { command } => commands::folders::handle_folders(&ctx, command),
        Commands::Bookmarks { command } => commands::bookmarks::handle_bookmarks(&ctx, command),
        Commands::Docs { command } => commands::docs::handle_docs(&ctx, command),
        Commands::Export {
            session,
            format,
            output,
        } => commands::export::run_export(&ctx, &session, format, output).map(|_| ()),
        Commands::Settings {
            language,
            dark_mode,
            profile_name,
            profile_subject,
            profile_level,
            profile_school,
        } => commands::settings::handle_settings(
            &ctx,
            SettingsUpdate {
                language,
                dark_mode,
                profile_name,
                profile_subject,
                profile_level,
                profile_school,
            },
        ),
        Commands::Stats => commands::stats::show_stats(&ctx),
    }
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` wins when set. Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "teachmate=debug"
    } else {
        "teachmate=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
