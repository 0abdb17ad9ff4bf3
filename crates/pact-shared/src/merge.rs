//! The state-merge engine behind the supporter's master view.
//!
//! Aggregation folds every known per-user document into one accumulator
//! seeded with the static catalog. The fold is total: partial fragments
//! contribute whatever they carry and can never make it fail.
//!
//! Per-field policy:
//! - `users`: only each fragment's `current_user` joins the roster. A
//!   fragment's embedded `users` array is ignored on purpose: it is a
//!   stale snapshot of the roster as that user last saw it, and unioning
//!   it would resurrect removed or duplicate entries.
//! - `records` / `messages` / `statuses`: plain concatenation in fragment
//!   iteration order. Each entry is authored inside exactly one user's
//!   document, so no cross-fragment dedup is attempted.
//! - `groups`: deduplicated by id, last writer wins. Friends' documents
//!   can carry stale copies of supporter-owned groups.
//! - `tasks`: always the static catalog; never merged.
//!
//! Fragment iteration order is store-enumeration order and is not stable
//! across runs. Chronological ordering is applied by the derived views at
//! query time, never here.

use crate::catalog;
use crate::types::AppDocument;

/// Fold one fragment into the accumulator.
pub fn merge_fragment(mut acc: AppDocument, fragment: AppDocument) -> AppDocument {
    if let Some(owner) = fragment.current_user {
        acc.users.push(owner);
    }

    acc.records.extend(fragment.records);
    acc.messages.extend(fragment.messages);
    acc.statuses.extend(fragment.statuses);

    for group in fragment.groups {
        match acc.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => acc.groups.push(group),
        }
    }

    acc
}

/// Aggregate all known fragments into the supporter's master document.
///
/// The result is a read-time derivation. It is never persisted back as a
/// document of its own.
pub fn aggregate<I>(fragments: I) -> AppDocument
where
    I: IntoIterator<Item = AppDocument>,
{
    fragments
        .into_iter()
        .fold(catalog::default_document(), merge_fragment)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Group, ProgressRecord, Role, StatusUpdate, User};

    fn owner(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            username: format!("{id}@example.com"),
            password: None,
            role: Role::Friend,
            bio: None,
            joined_at: Utc::now(),
        }
    }

    fn fragment_for(user: User) -> AppDocument {
        AppDocument {
            // A stale embedded roster that must NOT leak into the merge.
            users: vec![owner("ghost", "Ghost")],
            current_user: Some(user),
            ..AppDocument::default()
        }
    }

    #[test]
    fn roster_is_rebuilt_from_current_user_only() {
        let merged = aggregate([
            fragment_for(owner("f1", "Asha")),
            fragment_for(owner("f2", "Ben")),
        ]);

        let names: Vec<&str> = merged.users.iter().map(|u| u.name.as_str()).collect();
        assert!(names.contains(&"Asha"));
        assert!(names.contains(&"Ben"));
        assert!(!names.contains(&"Ghost"));
        // catalog admin + one representative per fragment
        assert_eq!(merged.users.len(), 3);
    }

    #[test]
    fn tasks_always_equal_the_catalog() {
        let mut fragment = fragment_for(owner("f1", "Asha"));
        fragment.tasks.clear();
        fragment.tasks.push(crate::types::Task {
            id: "bogus".into(),
            title: "Not a real task".into(),
            category: "None".into(),
        });

        let merged = aggregate([fragment]);
        assert_eq!(merged.tasks, catalog::default_tasks());
    }

    #[test]
    fn groups_deduplicate_with_last_writer_winning() {
        let group = |description: &str| Group {
            id: "g1".into(),
            name: "Q3 batch".into(),
            description: description.into(),
            member_ids: vec![],
            posts: vec![],
        };

        let mut first = fragment_for(owner("f1", "Asha"));
        first.groups.push(group("stale copy"));
        let mut second = fragment_for(owner("f2", "Ben"));
        second.groups.push(group("fresh copy"));

        let merged = aggregate([first, second]);
        assert_eq!(merged.groups.len(), 1);
        assert_eq!(merged.groups[0].description, "fresh copy");
    }

    #[test]
    fn records_and_statuses_concatenate() {
        let mut first = fragment_for(owner("f1", "Asha"));
        first.records.push(ProgressRecord::empty(
            "f1",
            chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        ));
        let mut second = fragment_for(owner("f2", "Ben"));
        second.statuses.push(StatusUpdate {
            id: "s1".into(),
            user_id: "f2".into(),
            user_name: "Ben".into(),
            content: Some("hi".into()),
            attachment: None,
            timestamp: Utc::now(),
        });

        let merged = aggregate([first, second]);
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.statuses.len(), 1);
    }

    #[test]
    fn empty_input_yields_the_default_document() {
        let merged = aggregate(std::iter::empty());
        assert_eq!(merged.tasks, catalog::default_tasks());
        assert!(merged.records.is_empty());
    }
}
