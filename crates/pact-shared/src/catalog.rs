//! Process-wide static configuration: the task catalog, the seeded
//! supporter account, and the motivational quote rotation.

use chrono::{Datelike, NaiveDate, Utc};

use crate::types::{AppDocument, Role, Task, User};

/// Namespace prefix for persisted document keys (`{namespace}_{userId}`).
pub const DOCUMENT_NAMESPACE: &str = "pact-v1";

/// Id of the seeded supporter account.
pub const SEED_ADMIN_ID: &str = "admin-1";

/// The task catalog. Identical for every user and never merged from
/// per-user documents.
pub fn default_tasks() -> Vec<Task> {
    [
        ("t1", "Deep Work Session", "Core"),
        ("t2", "Technical Reading", "Learning"),
        ("t3", "Physical Activity", "Health"),
        ("t4", "Personal Project", "Growth"),
    ]
    .into_iter()
    .map(|(id, title, category)| Task {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// The bootstrap user roster: exactly the seeded supporter. Friend
/// accounts are created through sign-up, never seeded.
pub fn seed_users() -> Vec<User> {
    vec![User {
        id: SEED_ADMIN_ID.to_string(),
        name: "Supporter".to_string(),
        username: "supporter@pact.local".to_string(),
        password: Some("pact-supporter".to_string()),
        role: Role::Admin,
        bio: None,
        joined_at: Utc::now(),
    }]
}

/// The default document a user starts from when neither store has data.
pub fn default_document() -> AppDocument {
    AppDocument {
        users: seed_users(),
        tasks: default_tasks(),
        records: Vec::new(),
        messages: Vec::new(),
        groups: Vec::new(),
        statuses: Vec::new(),
        current_user: None,
    }
}

const QUOTES: &[&str] = &[
    "Consistency is better than perfection.",
    "Your only limit is your mind.",
    "Small steps every day lead to big results.",
    "Discipline is choosing between what you want now and what you want most.",
    "The secret of getting ahead is getting started.",
];

/// Quote shown for a given calendar date. Selection is by day of month so
/// every client shows the same quote on the same day.
pub fn quote_of_the_day(date: NaiveDate) -> &'static str {
    QUOTES[date.day() as usize % QUOTES.len()]
}
