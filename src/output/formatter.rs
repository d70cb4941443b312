//! Terminal output formatting with ANSI colors.

use colored::Colorize;

use crate::chat::ChatMessage;
use crate::engine::events::Activity;

/// Echo the submitted question (used by `ask`, where the user never saw a
/// prompt line).
pub fn print_user_message(content: &str) {
    println!("{} {} {}", "you".cyan(), "->".dimmed(), content);
}

/// Print the agent's final answer.
pub fn print_agent_message(message: &ChatMessage) {
    println!();
    println!("{} {}", "agent".purple(), "->".dimmed());
    println!("{}", message.content);
}

/// Print one live timeline entry as it arrives.
pub fn print_activity(activity: &Activity) {
    println!(
        "  {} {}",
        format!("• {}", activity.title).blue(),
        truncate_to_line(&activity.data, 100).dimmed()
    );
}

/// Print the archived timeline under the answer it explains.
pub fn print_timeline_recap(activities: &[Activity]) {
    if activities.is_empty() {
        return;
    }
    println!();
    println!("{}", format!("─── research trail ({} steps)", activities.len()).dimmed());
    for activity in activities {
        println!("{}", format!("  {} — {}", activity.title, activity.data).dimmed());
    }
}

/// Print the stopped-run notice: the stream went idle without producing an
/// archivable answer.
pub fn print_run_stopped() {
    println!();
    println!("{}", "Run stopped before a final answer arrived.".yellow());
}

/// Print the cancellation notice.
pub fn print_cancelled() {
    println!();
    println!("{}", "Cancelled. Session reset.".yellow());
}

/// Print a non-fatal error line.
pub fn print_error(detail: &str) {
    eprintln!("{}", format!("✗ {}", detail).red());
}

/// Truncate a string to at most one line and `max_chars` characters.
fn truncate_to_line(s: &str, max_chars: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    if first_line.chars().count() > max_chars {
        let truncated: String = first_line.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}
