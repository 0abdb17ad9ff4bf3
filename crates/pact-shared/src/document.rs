//! Mutation helpers for [`AppDocument`].
//!
//! Each helper validates its input, applies the change in memory and
//! returns the created entity's id where one is minted. Persistence is
//! the sync orchestrator's job; nothing here does I/O.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::types::{
    new_id, AppDocument, Attachment, Group, GroupPost, Message, ProgressRecord, Role, StatusUpdate,
    User,
};

impl AppDocument {
    /// The record for `(user_id, date)`, or the implicit empty record if
    /// the date has never been touched. The implicit record is not added
    /// to the document.
    pub fn record_for(&self, user_id: &str, date: NaiveDate) -> ProgressRecord {
        self.records
            .iter()
            .find(|r| r.user_id == user_id && r.date == date)
            .cloned()
            .unwrap_or_else(|| ProgressRecord::empty(user_id, date))
    }

    /// Insert or update a day's record. `(user_id, date)` is the
    /// uniqueness key: an existing record is updated in place and keeps
    /// its id, so the record count never grows for a known pair.
    pub fn upsert_record(&mut self, record: ProgressRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.user_id == record.user_id && r.date == record.date)
        {
            Some(existing) => {
                let id = existing.id.clone();
                *existing = record;
                existing.id = id;
            }
            None => self.records.push(record),
        }
    }

    /// Append a direct message. Rejected when both the text and the
    /// attachment are absent; no state changes on rejection.
    pub fn send_message(
        &mut self,
        sender: &User,
        receiver_id: impl Into<String>,
        content: impl Into<String>,
        attachment: Option<Attachment>,
        timestamp: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() && attachment.is_none() {
            return Err(ValidationError::EmptyMessage);
        }
        let id = new_id();
        self.messages.push(Message {
            id: id.clone(),
            sender_id: sender.id.clone(),
            receiver_id: receiver_id.into(),
            content,
            attachment,
            timestamp,
        });
        Ok(id)
    }

    /// Append a broadcast status update, denormalizing the author's
    /// display name at creation time.
    pub fn post_status(
        &mut self,
        author: &User,
        content: Option<String>,
        attachment: Option<Attachment>,
        timestamp: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        let has_text = content.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_text && attachment.is_none() {
            return Err(ValidationError::EmptyStatus);
        }
        let id = new_id();
        self.statuses.push(StatusUpdate {
            id: id.clone(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            content,
            attachment,
            timestamp,
        });
        Ok(id)
    }

    /// Create a broadcast group. Supporter only.
    pub fn create_group(
        &mut self,
        actor: &User,
        name: impl Into<String>,
        description: impl Into<String>,
        member_ids: Vec<String>,
    ) -> Result<String, ValidationError> {
        if actor.role != Role::Admin {
            return Err(ValidationError::AdminOnly);
        }
        let id = new_id();
        self.groups.push(Group {
            id: id.clone(),
            name: name.into(),
            description: description.into(),
            member_ids,
            posts: Vec::new(),
        });
        Ok(id)
    }

    /// Replace a group's member set wholesale. Supporter only.
    pub fn set_group_members(
        &mut self,
        actor: &User,
        group_id: &str,
        member_ids: Vec<String>,
    ) -> Result<(), ValidationError> {
        if actor.role != Role::Admin {
            return Err(ValidationError::AdminOnly);
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ValidationError::UnknownGroup(group_id.to_string()))?;
        group.member_ids = member_ids;
        Ok(())
    }

    /// Append a post to a group's feed. Supporter only.
    pub fn post_to_group(
        &mut self,
        actor: &User,
        group_id: &str,
        content: impl Into<String>,
        attachment: Option<Attachment>,
        timestamp: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        if actor.role != Role::Admin {
            return Err(ValidationError::AdminOnly);
        }
        let content = content.into();
        if content.trim().is_empty() && attachment.is_none() {
            return Err(ValidationError::EmptyPost);
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| ValidationError::UnknownGroup(group_id.to_string()))?;
        let id = new_id();
        group.posts.push(GroupPost {
            id: id.clone(),
            content,
            attachment,
            timestamp,
            author_id: actor.id.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog;

    fn friend() -> User {
        User {
            id: "friend-1".into(),
            name: "Asha".into(),
            username: "asha@example.com".into(),
            password: None,
            role: Role::Friend,
            bio: None,
            joined_at: Utc::now(),
        }
    }

    fn admin() -> User {
        catalog::seed_users().remove(0)
    }

    #[test]
    fn upsert_updates_in_place_for_known_pair() {
        let mut doc = AppDocument::default();
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let mut record = doc.record_for("friend-1", date);
        record.tasks_completed = vec!["t1".into()];
        doc.upsert_record(record);
        assert_eq!(doc.records.len(), 1);
        let original_id = doc.records[0].id.clone();

        let mut edit = doc.record_for("friend-1", date);
        edit.time_spent_minutes = 40;
        doc.upsert_record(edit);

        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].id, original_id);
        assert_eq!(doc.records[0].time_spent_minutes, 40);
    }

    #[test]
    fn upsert_adds_exactly_one_for_new_pair() {
        let mut doc = AppDocument::default();
        let first = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();

        doc.upsert_record(doc.record_for("friend-1", first));
        doc.upsert_record(doc.record_for("friend-1", second));
        assert_eq!(doc.records.len(), 2);
    }

    #[test]
    fn untouched_date_is_an_implicit_empty_record() {
        let doc = AppDocument::default();
        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let record = doc.record_for("friend-1", date);
        assert!(record.tasks_completed.is_empty());
        assert!(doc.records.is_empty());
    }

    #[test]
    fn empty_message_is_rejected_without_mutation() {
        let mut doc = AppDocument::default();
        let err = doc
            .send_message(&friend(), "admin-1", "   ", None, Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyMessage);
        assert!(doc.messages.is_empty());
    }

    #[test]
    fn attachment_only_message_is_allowed() {
        let mut doc = AppDocument::default();
        let att = Attachment::from_bytes("pic.png", "image/png", &[1, 2, 3]);
        doc.send_message(&friend(), "admin-1", "", Some(att), Utc::now())
            .unwrap();
        assert_eq!(doc.messages.len(), 1);
    }

    #[test]
    fn status_denormalizes_author_name() {
        let mut doc = AppDocument::default();
        doc.post_status(&friend(), Some("on track".into()), None, Utc::now())
            .unwrap();
        assert_eq!(doc.statuses[0].user_name, "Asha");
    }

    #[test]
    fn group_mutations_are_supporter_only() {
        let mut doc = AppDocument::default();
        let err = doc
            .create_group(&friend(), "Q3 batch", "focus group", vec![])
            .unwrap_err();
        assert_eq!(err, ValidationError::AdminOnly);

        let id = doc
            .create_group(&admin(), "Q3 batch", "focus group", vec!["friend-1".into()])
            .unwrap();
        doc.set_group_members(&admin(), &id, vec!["friend-1".into(), "friend-2".into()])
            .unwrap();
        assert_eq!(doc.groups[0].member_ids.len(), 2);
    }

    #[test]
    fn posting_to_unknown_group_fails() {
        let mut doc = AppDocument::default();
        let err = doc
            .post_to_group(&admin(), "missing", "hello", None, Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownGroup("missing".into()));
    }
}
