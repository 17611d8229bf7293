// Rendering of per-relay publish results

use colored::*;
use serde_json::{json, Value};
use shout_core::PublishReport;

/// Print one line per relay, then a summary
pub fn print(report: &PublishReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(ack) if ack.accepted() => {
                println!("  {} {}", "✓".green(), outcome.relay.bright_cyan());
            }
            Ok(ack) => {
                println!(
                    "  {} {} answered {}{}",
                    "•".yellow(),
                    outcome.relay.bright_cyan(),
                    ack.detail,
                    ack.message
                        .as_deref()
                        .filter(|m| !m.is_empty())
                        .map(|m| format!(" ({})", m))
                        .unwrap_or_default()
                );
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), e.to_string().dimmed());
            }
        }
    }

    let summary = report.summary();
    println!();
    println!(
        "{} {}/{} relays acknowledged",
        "Done:".bold(),
        summary.fulfilled,
        summary.total
    );
}

/// Machine-readable form of a report
pub fn to_json(report: &PublishReport) -> Value {
    let outcomes: Vec<Value> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(ack) => json!({
                "relay": outcome.relay,
                "status": "fulfilled",
                "detail": ack.detail,
                "message": ack.message,
            }),
            Err(e) => json!({
                "relay": outcome.relay,
                "status": "rejected",
                "kind": e.kind(),
                "reason": e.to_string(),
            }),
        })
        .collect();

    json!({
        "summary": report.summary(),
        "outcomes": outcomes,
    })
}

/// Format a unix timestamp for display
pub fn format_timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
