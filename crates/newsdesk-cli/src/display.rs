use newsdesk_core::InteractionRecord;

const TEXT_WIDTH: usize = 48;

// ── History ──

pub fn print_history(rows: &[InteractionRecord]) {
    if rows.is_empty() {
        println!("No interactions recorded yet.");
        return;
    }

    println!(
        "  {:>6}  {:<19}  {:<16}  {:<9}  Text",
        "ID", "Time", "Name", "Category"
    );
    println!("  {}", "─".repeat(6 + 2 + 19 + 2 + 16 + 2 + 9 + 2 + TEXT_WIDTH));
    for row in rows {
        println!("  {}", format_row(row));
    }
    println!();
    println!("  {} interaction(s)", rows.len());
}

pub fn print_history_json(rows: &[InteractionRecord]) -> anyhow::Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn format_row(row: &InteractionRecord) -> String {
    let time = row
        .interaction_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into());
    format!(
        "{:>6}  {:<19}  {:<16}  {:<9}  {}",
        row.id,
        time,
        truncate(row.name.as_deref().unwrap_or("-"), 16),
        row.predicted_category.as_deref().unwrap_or("-"),
        row.input_text
            .as_deref()
            .map(|t| truncate(&one_line(t), TEXT_WIDTH))
            .unwrap_or_else(|| "-".into()),
    )
}

/// Collapse runs of whitespace, newlines included, to single spaces.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
