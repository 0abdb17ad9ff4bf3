//! AI insight prompts for the supporter and the daily encouragement for
//! friends.
//!
//! Prompt construction is pure and testable; the completion call itself
//! goes through [`CompletionClient`]. Every failure path resolves to a
//! deterministic fallback string; insights are decoration, never a
//! hard dependency.

use pact_remote::CompletionClient;
use pact_shared::types::{ProgressRecord, User};

/// Model used for both insight calls.
pub const COMPLETION_MODEL: &str = "gemini-3-flash-preview";

/// Fallback when the summary call fails.
pub const FALLBACK_SUMMARY: &str = "Summary unavailable.";

/// Fallback when there is nothing to summarize.
pub const FALLBACK_NO_JOURNALS: &str = "No journal entries yet.";

/// Fallback when the encouragement call fails.
pub const FALLBACK_INSPIRATION: &str = "Keep pushing forward, you're doing great!";

/// How many recent journal entries feed the summary.
const SUMMARY_WINDOW: usize = 5;

/// Build the supporter-facing summary prompt from a user's most recent
/// journal-bearing records. `None` when there are no journals at all.
pub fn summary_prompt(user: &User, records: &[ProgressRecord]) -> Option<String> {
    let mut journaled: Vec<&ProgressRecord> = records
        .iter()
        .filter(|r| r.user_id == user.id && !r.day_journal.trim().is_empty())
        .collect();
    journaled.sort_by(|a, b| b.date.cmp(&a.date));

    let journals = journaled
        .iter()
        .take(SUMMARY_WINDOW)
        .map(|r| format!("Date: {}, Journal: {}", r.date, r.day_journal))
        .collect::<Vec<_>>()
        .join("\n\n");

    if journals.is_empty() {
        return None;
    }

    Some(format!(
        "Summarize the recent mental state and progress of {} based on these journals:\n{}\n\n\
         Identify if they are feeling overwhelmed, motivated, or stagnant. \
         Keep it concise for a Supporter/Coach.",
        user.name, journals
    ))
}

/// Build the one-sentence encouragement prompt for a day's record.
pub fn inspiration_prompt(record: &ProgressRecord) -> String {
    format!(
        "The user completed these tasks: {} tasks.\n\
         They spent {} minutes.\n\
         Their journal was: \"{}\".\n\n\
         Give them one punchy, highly encouraging sentence to keep them going tomorrow.",
        record.tasks_completed.len(),
        record.time_spent_minutes,
        record.day_journal
    )
}

/// Summarize a friend's recent journals for the supporter.
pub async fn journal_summary(
    client: &CompletionClient,
    user: &User,
    records: &[ProgressRecord],
) -> String {
    let Some(prompt) = summary_prompt(user, records) else {
        return FALLBACK_NO_JOURNALS.to_string();
    };

    match client.complete(COMPLETION_MODEL, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_SUMMARY.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "journal summary unavailable");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

/// One encouraging sentence for the day just logged.
pub async fn daily_inspiration(client: &CompletionClient, record: &ProgressRecord) -> String {
    let prompt = inspiration_prompt(record);

    match client.complete(COMPLETION_MODEL, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => FALLBACK_INSPIRATION.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "daily inspiration unavailable");
            FALLBACK_INSPIRATION.to_string()
        }
    }
}
