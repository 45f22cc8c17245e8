//! Session CLI commands: statistics and the session index.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Print total, user and system message counts for a session.
pub async fn session_stats(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let stats = state
        .message_service
        .get_session_statistics(session_id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Total").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("System").fg(Color::White),
    ]);
    table.add_row(vec![
        Cell::new(stats.total_messages).fg(Color::Cyan),
        Cell::new(stats.user_messages).fg(Color::Green),
        Cell::new(stats.system_messages).fg(Color::Yellow),
    ]);

    println!();
    println!("  Statistics for '{}'", style(session_id).cyan().bold());
    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// List session ids, most recently active first.
pub async fn list_sessions(state: &AppState, limit: i64, json: bool) -> Result<()> {
    let sessions = state.message_service.list_session_ids(limit).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "sessions": sessions }))?
        );
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Store one with: {}",
            style("i").blue().bold(),
            style("missive send --session <id> --content <text>").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    for session_id in &sessions {
        println!("  {} {}", style("•").dim(), style(session_id).cyan());
    }
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}
