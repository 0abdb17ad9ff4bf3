//! The sync orchestrator.
//!
//! Chooses local vs remote per operation, with the local store as an
//! always-on write-through cache. One orchestrator owns one in-memory
//! document and is the single writer for it; the supporter's master view
//! is assembled read-time by the merge engine and never written back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;

use pact_remote::auth::SignUpProfile;
use pact_remote::{AuthChange, AuthError, RemoteClient};
use pact_shared::types::{
    is_remote_backed, AppDocument, Attachment, ProgressRecord, Role, User,
};
use pact_shared::{catalog, codec, merge};
use pact_store::Database;

use crate::error::ClientError;
use crate::session::{user_from_auth, user_from_local, SessionPhase};
use crate::Result;

/// How long after a settled load the write-through path stays suppressed,
/// so a freshly fetched document is never re-persisted as an edit.
const AUTOSAVE_GRACE: Duration = Duration::from_millis(500);

/// Client-side sync state machine. See the crate docs for the lifecycle:
/// `Unauthenticated → SessionResolving → DocumentLoading → Ready`.
pub struct SyncOrchestrator {
    db: Database,
    remote: Option<Arc<RemoteClient>>,
    phase: SessionPhase,
    session_user: Option<User>,
    document: Option<AppDocument>,
    autosave_suppressed: Arc<AtomicBool>,
    /// Last user id seen from the auth-change stream, for deduplication.
    last_auth_user_id: Option<String>,
}

impl SyncOrchestrator {
    /// Build an orchestrator over an open store and an optional remote
    /// (already constructed from the startup-resolved configuration).
    pub fn new(db: Database, remote: Option<RemoteClient>) -> Self {
        Self {
            db,
            remote: remote.map(Arc::new),
            phase: SessionPhase::Unauthenticated,
            session_user: None,
            document: None,
            autosave_suppressed: Arc::new(AtomicBool::new(true)),
            last_auth_user_id: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session_user.as_ref()
    }

    pub fn document(&self) -> Option<&AppDocument> {
        self.document.as_ref()
    }

    pub fn store(&self) -> &Database {
        &self.db
    }

    /// Whether remote mirroring is configured for this process.
    pub fn is_remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// The auth-change stream, when a remote is configured. Feed it to
    /// [`run_auth_listener`] for the lifetime of the application.
    pub fn auth_events(&self) -> Option<broadcast::Receiver<AuthChange>> {
        self.remote.as_ref().map(|r| r.subscribe())
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Resolve the current session: the remote session when a remote is
    /// configured, the local session marker otherwise.
    pub async fn resolve_session(&mut self) -> Result<Option<User>> {
        self.phase = SessionPhase::SessionResolving;

        let user = match &self.remote {
            Some(remote) => remote.current_session().await.map(|u| user_from_auth(&u)),
            None => match self.db.local_session()? {
                Some(id) => self
                    .db
                    .local_account_by_id(&id)?
                    .map(|a| user_from_local(&a)),
                None => None,
            },
        };

        match user {
            Some(user) => {
                self.establish(user.clone());
                Ok(Some(user))
            }
            None => {
                self.phase = SessionPhase::Unauthenticated;
                Ok(None)
            }
        }
    }

    /// Register a new account and establish its session.
    pub async fn sign_up(&mut self, email: &str, password: &str, name: &str) -> Result<User> {
        self.phase = SessionPhase::SessionResolving;

        let user = match &self.remote {
            Some(remote) => {
                let profile = SignUpProfile {
                    name: Some(name.to_string()),
                    role: Some(Role::Friend),
                };
                match remote.sign_up(email, password, profile).await {
                    Ok(auth_user) => user_from_auth(&auth_user),
                    Err(e) => {
                        self.phase = SessionPhase::Unauthenticated;
                        return Err(e.into());
                    }
                }
            }
            None => {
                let account = self
                    .db
                    .register_local_account(email, password, name, Role::Friend)?;
                match account {
                    Some(account) => {
                        self.db.set_local_session(&account.id)?;
                        user_from_local(&account)
                    }
                    None => {
                        self.phase = SessionPhase::Unauthenticated;
                        return Err(AuthError::AccountExists.into());
                    }
                }
            }
        };

        self.establish(user.clone());
        Ok(user)
    }

    /// Sign in and establish the session.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<User> {
        self.phase = SessionPhase::SessionResolving;

        let user = match &self.remote {
            Some(remote) => match remote.sign_in(email, password).await {
                Ok(auth_user) => user_from_auth(&auth_user),
                Err(e) => {
                    self.phase = SessionPhase::Unauthenticated;
                    return Err(e.into());
                }
            },
            None => match self.sign_in_local(email, password)? {
                Some(user) => user,
                None => {
                    self.phase = SessionPhase::Unauthenticated;
                    return Err(AuthError::InvalidCredentials.into());
                }
            },
        };

        self.establish(user.clone());
        Ok(user)
    }

    /// Local-registry sign-in, with a fallback to the seeded supporter
    /// credentials so a fresh install is reachable.
    fn sign_in_local(&self, email: &str, password: &str) -> Result<Option<User>> {
        if let Some(account) = self.db.find_local_account(email, password)? {
            self.db.set_local_session(&account.id)?;
            return Ok(Some(user_from_local(&account)));
        }

        let seeded = catalog::seed_users().into_iter().find(|u| {
            u.username == email && u.password.as_deref() == Some(password)
        });
        if let Some(admin) = seeded {
            self.db.set_local_session(&admin.id)?;
            return Ok(Some(admin));
        }

        Ok(None)
    }

    /// Clear session state on every layer: remote token, local marker,
    /// in-memory document.
    pub async fn sign_out(&mut self) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.sign_out().await;
        }
        self.db.clear_local_session()?;

        self.session_user = None;
        self.document = None;
        self.last_auth_user_id = None;
        self.autosave_suppressed.store(true, Ordering::SeqCst);
        self.phase = SessionPhase::Unauthenticated;

        tracing::info!("signed out");
        Ok(())
    }

    fn establish(&mut self, user: User) {
        self.last_auth_user_id = Some(user.id.clone());
        self.session_user = Some(user);
    }

    // ------------------------------------------------------------------
    // Load / save
    // ------------------------------------------------------------------

    /// Load the signed-in user's document.
    ///
    /// Supporter: aggregate every known fragment through the merge engine
    /// (remote full scan when configured, local enumeration otherwise).
    /// Friend: remote point read when the id is remote-backed, local
    /// cache on miss or failure, catalog default as the last resort.
    pub async fn load(&mut self) -> Result<()> {
        let user = self.session_user.clone().ok_or(ClientError::NoSession)?;

        self.phase = SessionPhase::DocumentLoading;
        self.autosave_suppressed.store(true, Ordering::SeqCst);

        let mut document = match user.role {
            Role::Admin => merge::aggregate(self.collect_fragments().await?),
            Role::Friend => self.load_own_document(&user).await?,
        };
        document.current_user = Some(user);

        self.document = Some(document);
        self.phase = SessionPhase::Ready;

        // Clear the write-through suppression once the load has settled.
        let flag = Arc::clone(&self.autosave_suppressed);
        tokio::spawn(async move {
            tokio::time::sleep(AUTOSAVE_GRACE).await;
            flag.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    async fn collect_fragments(&self) -> Result<Vec<AppDocument>> {
        if let Some(remote) = &self.remote {
            match remote.list_documents().await {
                Ok(fragments) => return Ok(fragments),
                Err(e) => {
                    tracing::warn!(error = %e, "remote scan failed; aggregating local cache");
                }
            }
        }

        let mut fragments = Vec::new();
        for text in self.db.all_document_texts()? {
            match codec::decode(&text) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => tracing::warn!(error = %e, "skipping undecodable cached document"),
            }
        }
        Ok(fragments)
    }

    async fn load_own_document(&self, user: &User) -> Result<AppDocument> {
        if let Some(remote) = &self.remote {
            if is_remote_backed(&user.id) {
                match remote.get_document(&user.id).await {
                    Ok(Some(document)) => return Ok(document),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "remote fetch failed; using local cache");
                    }
                }
            }
        }

        if let Some(text) = self.db.get_document_text(&user.id)? {
            match codec::decode(&text) {
                Ok(document) => return Ok(document),
                Err(e) => {
                    tracing::warn!(error = %e, "cached document corrupt; starting from default");
                }
            }
        }

        Ok(catalog::default_document())
    }

    /// Write-through persistence of the in-memory document.
    ///
    /// No-op for the supporter (the master view is synthetic) and while
    /// post-load suppression is active. The local write must succeed; the
    /// remote mirror is best-effort.
    pub async fn save(&mut self) -> Result<()> {
        let Some(user) = self.session_user.clone() else {
            return Ok(());
        };
        if user.role == Role::Admin {
            return Ok(());
        }
        if self.autosave_suppressed.load(Ordering::SeqCst) {
            tracing::debug!("autosave suppressed; skipping persist");
            return Ok(());
        }
        let Some(document) = self.document.as_mut() else {
            return Ok(());
        };

        document.current_user = Some(user.clone());
        let text = codec::encode(document);
        self.db.put_document_text(&user.id, &text)?;

        if let (Some(remote), Some(document)) = (&self.remote, &self.document) {
            if is_remote_backed(&user.id) {
                if let Err(e) = remote.put_document(&user.id, document).await {
                    tracing::warn!(error = %e, "remote mirror failed; local copy is current");
                }
            }
        }

        Ok(())
    }

    /// Replace the in-memory document wholesale (an embedding UI's state
    /// handoff) and persist through the write-through path.
    pub async fn set_document(&mut self, document: AppDocument) -> Result<()> {
        self.document = Some(document);
        self.save().await
    }

    /// A genuine user edit ends the post-load grace window and persists.
    async fn commit(&mut self) -> Result<()> {
        self.autosave_suppressed.store(false, Ordering::SeqCst);
        self.save().await
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn document_mut(&mut self) -> Result<(&mut AppDocument, User)> {
        let user = self.session_user.clone().ok_or(ClientError::NoSession)?;
        let document = self.document.as_mut().ok_or(ClientError::NoSession)?;
        Ok((document, user))
    }

    /// Upsert a day's progress record.
    pub async fn update_record(&mut self, record: ProgressRecord) -> Result<()> {
        let (document, _) = self.document_mut()?;
        document.upsert_record(record);
        self.commit().await
    }

    /// Send a direct message from the signed-in user.
    pub async fn send_message(
        &mut self,
        receiver_id: &str,
        content: &str,
        attachment: Option<Attachment>,
    ) -> Result<String> {
        let (document, user) = self.document_mut()?;
        let id = document.send_message(&user, receiver_id, content, attachment, Utc::now())?;
        self.commit().await?;
        Ok(id)
    }

    /// Broadcast a status update from the signed-in user.
    pub async fn upload_status(
        &mut self,
        content: Option<String>,
        attachment: Option<Attachment>,
    ) -> Result<String> {
        let (document, user) = self.document_mut()?;
        let id = document.post_status(&user, content, attachment, Utc::now())?;
        self.commit().await?;
        Ok(id)
    }

    /// Create a broadcast group (supporter only).
    pub async fn create_group(
        &mut self,
        name: &str,
        description: &str,
        member_ids: Vec<String>,
    ) -> Result<String> {
        let (document, user) = self.document_mut()?;
        let id = document.create_group(&user, name, description, member_ids)?;
        self.commit().await?;
        Ok(id)
    }

    /// Replace a group's member set (supporter only).
    pub async fn set_group_members(
        &mut self,
        group_id: &str,
        member_ids: Vec<String>,
    ) -> Result<()> {
        let (document, user) = self.document_mut()?;
        document.set_group_members(&user, group_id, member_ids)?;
        self.commit().await
    }

    /// Post into a group's feed (supporter only).
    pub async fn post_to_group(
        &mut self,
        group_id: &str,
        content: &str,
        attachment: Option<Attachment>,
    ) -> Result<String> {
        let (document, user) = self.document_mut()?;
        let id = document.post_to_group(&user, group_id, content, attachment, Utc::now())?;
        self.commit().await?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Auth-change stream
    // ------------------------------------------------------------------

    /// React to a session transition observed out of band (another tab,
    /// a token refresh). Idempotent: an event naming the already-current
    /// user does not re-trigger a load.
    pub async fn handle_auth_change(&mut self, change: AuthChange) -> Result<()> {
        match change {
            AuthChange::SignedIn(auth_user) => {
                if self.last_auth_user_id.as_deref() == Some(auth_user.id.as_str()) {
                    tracing::debug!(user_id = %auth_user.id, "auth event for current user; ignoring");
                    return Ok(());
                }
                let user = user_from_auth(&auth_user);
                tracing::info!(user_id = %user.id, "session changed; reloading");
                self.establish(user);
                self.load().await?;
                Ok(())
            }
            AuthChange::SignedOut => {
                if self.session_user.is_some() {
                    tracing::info!("session ended remotely");
                    self.session_user = None;
                    self.document = None;
                    self.last_auth_user_id = None;
                    self.autosave_suppressed.store(true, Ordering::SeqCst);
                    self.phase = SessionPhase::Unauthenticated;
                }
                Ok(())
            }
        }
    }
}

/// Drive the auth-change stream into an orchestrator for the application
/// lifetime. Spawn this once after startup when a remote is configured.
pub async fn run_auth_listener(
    orchestrator: Arc<tokio::sync::Mutex<SyncOrchestrator>>,
    mut events: broadcast::Receiver<AuthChange>,
) {
    loop {
        match events.recv().await {
            Ok(change) => {
                let mut orchestrator = orchestrator.lock().await;
                if let Err(e) = orchestrator.handle_auth_change(change).await {
                    tracing::warn!(error = %e, "auth-change handling failed");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "auth-change stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pact_remote::RemoteConfig;
    use pact_shared::views;

    use super::*;

    fn local_orchestrator() -> SyncOrchestrator {
        SyncOrchestrator::new(Database::open_in_memory().unwrap(), None)
    }

    /// A remote pointed at a port nothing listens on: every call fails
    /// fast with a connection error.
    fn unreachable_remote() -> RemoteClient {
        RemoteClient::new(RemoteConfig::new("http://127.0.0.1:9", "anon-key"))
    }

    fn seeded_friend_doc(user_id: &str, name: &str) -> AppDocument {
        let mut doc = catalog::default_document();
        let user = User {
            id: user_id.into(),
            name: name.into(),
            username: format!("{name}@example.com").to_lowercase(),
            password: None,
            role: Role::Friend,
            bio: None,
            joined_at: Utc::now(),
        };
        let mut record = doc.record_for(user_id, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        record.tasks_completed = vec!["t1".into()];
        doc.upsert_record(record);
        doc.current_user = Some(user);
        doc
    }

    #[tokio::test]
    async fn no_save_between_load_and_first_edit() {
        let mut orch = local_orchestrator();
        let user = orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();

        orch.load().await.unwrap();
        assert_eq!(orch.phase(), SessionPhase::Ready);

        // The write-through path runs but must not persist the
        // freshly loaded document.
        orch.save().await.unwrap();
        assert_eq!(orch.store().get_document_text(&user.id).unwrap(), None);

        // A real edit persists immediately.
        let date = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let mut record = orch.document().unwrap().record_for(&user.id, date);
        record.tasks_completed = vec!["t1".into()];
        orch.update_record(record).await.unwrap();

        let saved = orch.store().get_document_text(&user.id).unwrap();
        assert!(saved.is_some());
        let decoded = codec::decode(&saved.unwrap()).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.current_user.as_ref().unwrap().id, user.id);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_window_expires_on_its_own() {
        let mut orch = local_orchestrator();
        let user = orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();
        orch.load().await.unwrap();

        tokio::time::sleep(Duration::from_millis(600)).await;

        orch.save().await.unwrap();
        assert!(orch.store().get_document_text(&user.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local_cache() {
        let db = Database::open_in_memory().unwrap();
        let cached = seeded_friend_doc("u-remote-1", "Asha");
        db.put_document_text("u-remote-1", &codec::encode(&cached))
            .unwrap();

        let mut orch = SyncOrchestrator::new(db, Some(unreachable_remote()));

        let auth_user = pact_remote::AuthUser {
            id: "u-remote-1".into(),
            email: Some("asha@example.com".into()),
            user_metadata: SignUpProfile {
                name: Some("Asha".into()),
                role: Some(Role::Friend),
            },
            created_at: Utc::now(),
        };
        orch.handle_auth_change(AuthChange::SignedIn(auth_user))
            .await
            .unwrap();

        let doc = orch.document().unwrap();
        assert_eq!(doc.records.len(), 1, "cached document should be served");
        assert_eq!(orch.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn remote_failure_with_empty_cache_yields_default() {
        let mut orch =
            SyncOrchestrator::new(Database::open_in_memory().unwrap(), Some(unreachable_remote()));

        let auth_user = pact_remote::AuthUser {
            id: "u-remote-2".into(),
            email: Some("ben@example.com".into()),
            user_metadata: SignUpProfile::default(),
            created_at: Utc::now(),
        };
        orch.handle_auth_change(AuthChange::SignedIn(auth_user))
            .await
            .unwrap();

        let doc = orch.document().unwrap();
        assert_eq!(doc.tasks, catalog::default_tasks());
        assert!(doc.records.is_empty());
    }

    #[tokio::test]
    async fn duplicate_auth_event_does_not_reload() {
        let mut orch = local_orchestrator();
        let user = orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();
        orch.load().await.unwrap();

        orch.send_message("admin-1", "hello", None).await.unwrap();
        assert_eq!(orch.document().unwrap().messages.len(), 1);

        // Drop the persisted copy: a reload would now come back empty,
        // so surviving in-memory state proves the event was ignored.
        orch.store().remove_document(&user.id).unwrap();

        let auth_user = pact_remote::AuthUser {
            id: user.id.clone(),
            email: Some(user.username.clone()),
            user_metadata: SignUpProfile::default(),
            created_at: Utc::now(),
        };
        orch.handle_auth_change(AuthChange::SignedIn(auth_user))
            .await
            .unwrap();

        assert_eq!(orch.document().unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn supporter_view_aggregates_and_is_never_persisted() {
        let db = Database::open_in_memory().unwrap();
        db.put_document_text("f1", &codec::encode(&seeded_friend_doc("f1", "Asha")))
            .unwrap();
        db.put_document_text("f2", &codec::encode(&seeded_friend_doc("f2", "Ben")))
            .unwrap();

        let mut orch = SyncOrchestrator::new(db, None);
        let admin = orch
            .sign_in("supporter@pact.local", "pact-supporter")
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        orch.load().await.unwrap();
        let doc = orch.document().unwrap();
        assert_eq!(views::friends(&doc.users).len(), 2);
        assert_eq!(doc.records.len(), 2);
        assert_eq!(doc.tasks, catalog::default_tasks());

        // Supporter mutations stay in memory only.
        orch.send_message("f1", "keep going", None).await.unwrap();
        assert_eq!(
            orch.store().get_document_text(&admin.id).unwrap(),
            None,
            "the master view must never be persisted"
        );
    }

    #[tokio::test]
    async fn corrupt_cached_document_recovers_to_default() {
        let db = Database::open_in_memory().unwrap();
        db.put_document_text("local-x", "{definitely not json")
            .unwrap();

        let mut orch = SyncOrchestrator::new(db, None);
        orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();

        // Overwrite the signed-up account's cache with garbage.
        let id = orch.current_user().unwrap().id.clone();
        orch.store().put_document_text(&id, "{broken").unwrap();

        orch.load().await.unwrap();
        let doc = orch.document().unwrap();
        assert_eq!(doc.tasks, catalog::default_tasks());
    }

    #[tokio::test]
    async fn sign_out_clears_every_layer() {
        let mut orch = local_orchestrator();
        orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();
        orch.load().await.unwrap();

        orch.sign_out().await.unwrap();
        assert_eq!(orch.phase(), SessionPhase::Unauthenticated);
        assert!(orch.current_user().is_none());
        assert!(orch.document().is_none());
        assert_eq!(orch.store().local_session().unwrap(), None);
    }

    #[tokio::test]
    async fn resolve_session_restores_local_account() {
        let mut orch = local_orchestrator();
        let user = orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();

        // Forget the in-memory session; the persisted marker remains.
        orch.session_user = None;
        orch.last_auth_user_id = None;
        orch.phase = SessionPhase::Unauthenticated;

        let resolved = orch.resolve_session().await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
        assert_eq!(orch.phase(), SessionPhase::SessionResolving);
    }

    #[tokio::test]
    async fn validation_failures_do_not_mutate_or_persist() {
        let mut orch = local_orchestrator();
        let user = orch.sign_up("asha@example.com", "pw", "Asha").await.unwrap();
        orch.load().await.unwrap();

        let err = orch.send_message("admin-1", "   ", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(orch.document().unwrap().messages.is_empty());
        assert_eq!(orch.store().get_document_text(&user.id).unwrap(), None);

        let err = orch
            .create_group("Q3 batch", "focus group", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
