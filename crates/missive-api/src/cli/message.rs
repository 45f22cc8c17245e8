//! Message CLI commands: send, show, list, search, delete.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use serde_json::{Map, Value};

use missive_types::message::{MessageView, Sender};

use crate::state::AppState;

/// Arguments of `missive send`.
pub struct SendArgs {
    pub session: String,
    pub sender: String,
    pub content: String,
    pub id: Option<String>,
    pub timestamp: Option<String>,
}

impl SendArgs {
    /// The raw candidate handed to the message pipeline.
    fn into_candidate(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("session_id".into(), Value::String(self.session));
        map.insert("sender".into(), Value::String(self.sender));
        map.insert("content".into(), Value::String(self.content));
        if let Some(id) = self.id {
            map.insert("message_id".into(), Value::String(id));
        }
        if let Some(ts) = self.timestamp {
            map.insert("timestamp".into(), Value::String(ts));
        }
        map
    }
}

fn sender_cell(sender: Sender) -> Cell {
    match sender {
        Sender::User => Cell::new("user").fg(Color::Green),
        Sender::System => Cell::new("system").fg(Color::Yellow),
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() > max_chars {
        let cut: String = content.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}

fn message_table(messages: &[MessageView], show_session: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Timestamp").fg(Color::White),
        Cell::new("Sender").fg(Color::White),
    ];
    if show_session {
        header.push(Cell::new("Session").fg(Color::White));
    }
    header.push(Cell::new("Content").fg(Color::White));
    table.set_header(header);

    for msg in messages {
        let mut row = vec![
            Cell::new(&msg.message_id).fg(Color::Cyan),
            Cell::new(&msg.timestamp).fg(Color::DarkGrey),
            sender_cell(msg.sender),
        ];
        if show_session {
            row.push(Cell::new(&msg.session_id).fg(Color::White));
        }
        row.push(Cell::new(preview(&msg.content, 60)));
        table.add_row(row);
    }

    table
}

fn print_message(msg: &MessageView) {
    println!();
    println!("  {} {}", style("Message").bold(), style(&msg.message_id).cyan());
    println!("  {:<11} {}", style("Session:").dim(), msg.session_id);
    println!("  {:<11} {}", style("Sender:").dim(), msg.sender);
    println!("  {:<11} {}", style("Timestamp:").dim(), msg.timestamp);
    println!(
        "  {:<11} {} words, {} characters",
        style("Metadata:").dim(),
        msg.metadata.word_count,
        msg.metadata.character_count
    );
    println!();
    println!("  {}", msg.content);
    println!();
}

/// Validate and store a message.
pub async fn send_message(state: &AppState, args: SendArgs, json: bool) -> Result<()> {
    let view = state
        .message_service
        .process_message(&args.into_candidate())
        .await
        .context("Failed to store message")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Stored message {} in session '{}'",
        style("✓").green().bold(),
        style(&view.message_id).cyan(),
        style(&view.session_id).bold()
    );
    println!();
    Ok(())
}

pub async fn show_message(state: &AppState, message_id: &str, json: bool) -> Result<()> {
    let view = state
        .message_service
        .get_message_by_id(message_id)
        .await
        .with_context(|| format!("Message '{message_id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_message(&view);
    }
    Ok(())
}

/// List a session's messages with pagination info.
///
/// # Examples
///
/// ```bash
/// missive list support-42 --limit 20 --sender user
/// ```
pub async fn list_messages(
    state: &AppState,
    session_id: &str,
    limit: i64,
    offset: i64,
    sender: Option<&str>,
    json: bool,
) -> Result<()> {
    let page = state
        .message_service
        .get_messages_by_session(session_id, limit, offset, sender)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.messages.is_empty() {
        println!();
        println!(
            "  {} No messages in session '{}'.",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  Messages in '{}'", style(session_id).cyan().bold());
    println!();
    println!("{}", message_table(&page.messages, false));
    println!();
    let p = &page.pagination;
    println!(
        "  {} of {} (offset {}){}",
        style(page.messages.len()).bold(),
        style(p.total).bold(),
        p.offset,
        if p.has_next {
            format!(", next: --offset {}", p.offset + p.limit)
        } else {
            String::new()
        }
    );
    println!();
    Ok(())
}

pub async fn search_messages(
    state: &AppState,
    query: &str,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    let results = state
        .message_service
        .search_messages_globally(query, limit, offset)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.data.is_empty() {
        println!();
        println!("  {} No messages match '{}'.", style("i").blue().bold(), query);
        println!();
        return Ok(());
    }

    println!();
    println!("{}", message_table(&results.data, true));
    println!();
    println!(
        "  {} result{}{}",
        style(results.pagination.total_results).bold(),
        if results.pagination.total_results == 1 { "" } else { "s" },
        results
            .pagination
            .next_offset
            .map(|next| format!(", next: --offset {next}"))
            .unwrap_or_default()
    );
    println!();
    Ok(())
}

/// Delete a message, asking for confirmation unless `force` or `json`.
pub async fn delete_message(state: &AppState, message_id: &str, force: bool, json: bool) -> Result<()> {
    let view = state
        .message_service
        .get_message_by_id(message_id)
        .await
        .with_context(|| format!("Message '{message_id}' not found"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete message '{}' from session '{}'?",
                style(&view.message_id).red().bold(),
                view.session_id
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.message_service.delete_message(message_id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": true, "message_id": message_id })
        );
    } else {
        println!(
            "  {} Deleted message {}",
            style("✓").green().bold(),
            style(message_id).cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_includes_optional_fields_only_when_set() {
        let args = SendArgs {
            session: "s1".into(),
            sender: "user".into(),
            content: "hi".into(),
            id: None,
            timestamp: Some("2023-06-15T14:30:00Z".into()),
        };
        let map = args.into_candidate();
        assert_eq!(map["session_id"], "s1");
        assert!(!map.contains_key("message_id"));
        assert_eq!(map["timestamp"], "2023-06-15T14:30:00Z");
    }

    #[test]
    fn preview_truncates_by_chars() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ñandú ñandú ñandú", 8), "ñandú...");
    }
}
