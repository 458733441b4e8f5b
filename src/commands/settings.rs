//! Preferences: reply language, palette and teacher profile

use colored::Colorize;

use super::AppContext;
use crate::error::{Result, TeachmateError};
use crate::prompts::{language_label, LANGUAGES};

/// Requested preference changes; `None` leaves a value alone
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub language: Option<String>,
    pub dark_mode: Option<bool>,
    pub profile_name: Option<String>,
    pub profile_subject: Option<String>,
    pub profile_level: Option<String>,
    pub profile_school: Option<String>,
}

impl SettingsUpdate {
    fn touches_profile(&self) -> bool {
        self.profile_name.is_some()
            || self.profile_subject.is_some()
            || self.profile_level.is_some()
            || self.profile_school.is_some()
    }
}

/// Apply any requested changes, then print the current settings
pub fn handle_settings(ctx: &AppContext, update: SettingsUpdate) -> Result<()> {
    let store = &ctx.store;

    if let Some(code) = &update.language {
        let code = code.trim().to_lowercase();
        if !LANGUAGES.iter().any(|(c, _)| *c == code) {
            let known: Vec<&str> = LANGUAGES.iter().map(|(c, _)| *c).collect();
            return Err(TeachmateError::Config(format!(
                "Unsupported language {}; choose one of {}",
                code,
                known.join(", ")
            ))
            .into());
        }
        store.set_ai_language(&code)?;
    }

    if let Some(dark) = update.dark_mode {
        store.set_dark_mode(dark)?;
    }

    if update.touches_profile() {
        let mut profile = store
            .teacher_profile()?
            .unwrap_or_else(|| ctx.config.assistant.profile.clone());
        if let Some(name) = update.profile_name {
            profile.name = name.trim().to_string();
        }
        if let Some(subject) = update.profile_subject {
            profile.subject = subject.trim().to_string();
        }
        if let Some(level) = update.profile_level {
            profile.school_level = level.trim().to_string();
        }
        if let Some(school) = update.profile_school {
            let school = school.trim().to_string();
            profile.school_name = if school.is_empty() {
                None
            } else {
                Some(school)
            };
        }
        store.set_teacher_profile(&profile)?;
        tracing::info!(name = %profile.name, "Teacher profile updated");
    }

    print_settings(ctx)
}

fn print_settings(ctx: &AppContext) -> Result<()> {
    let assistant = ctx.assistant();
    let profile = assistant.profile()?;
    let language = assistant.language()?;
    let dark = ctx.store.dark_mode()?.unwrap_or(true);

    println!("\n{}", "Settings".bold());
    println!(
        "  Language:   {} ({})",
        language_label(&language).cyan(),
        language
    );
    println!("  Dark mode:  {}", if dark { "on" } else { "off" });
    println!("\n{}", "Teacher profile".bold());
    println!("  Name:       {}", profile.name);
    println!("  Subject:    {}", profile.subject);
    println!("  Level:      {}", profile.school_level);
    println!(
        "  School:     {}",
        profile.school_name.as_deref().unwrap_or("-")
    );
    println!();
    Ok(())
}
