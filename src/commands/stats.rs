//! Usage dashboard

use colored::Colorize;
use prettytable::{format, row, Table};

use super::AppContext;
use crate::error::Result;
use crate::storage::{DashboardStats, DayActivity};

const BAR_WIDTH: usize = 20;

/// Print the usage dashboard
pub fn show_stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx.store.dashboard_stats()?;
    print_dashboard(&stats);
    Ok(())
}

fn print_dashboard(stats: &DashboardStats) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["Conversations", stats.total_chats]);
    table.add_row(row!["Messages", stats.total_messages]);
    table.add_row(row!["Assistant replies", stats.total_ai_messages]);
    table.add_row(row!["Reference documents", stats.total_documents]);
    table.add_row(row![
        "Hours saved (est.)",
        format!("{:.1}", stats.estimated_hours_saved).green()
    ]);

    println!("\n{}", "Dashboard".bold());
    table.printstd();

    if !stats.tag_breakdown.is_empty() {
        let mut tags: Vec<(&String, &usize)> = stats.tag_breakdown.iter().collect();
        tags.sort_by(|a, b| b.1.cmp(a.1));
        println!("\n{}", "Topics".bold());
        for (tag, count) in tags {
            println!("  {:<20} {}", tag, count);
        }
    }

    println!("\n{}", "Last 7 days".bold());
    for line in activity_bars(&stats.weekly_activity) {
        println!("  {}", line);
    }
    println!();
}

/// One bar per day, scaled to the busiest day
fn activity_bars(days: &[DayActivity]) -> Vec<String> {
    let max = days.iter().map(|d| d.count).max().unwrap_or(0).max(1);
    days.iter()
        .map(|d| {
            let width = (d.count * BAR_WIDTH).div_ceil(max);
            format!(
                "{:<3} {:<width$} {}",
                d.day,
                "█".repeat(width),
                d.count,
                width = BAR_WIDTH
            )
        })
        .collect()
}
