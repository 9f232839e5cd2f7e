//! Session lifecycle and ownership.
//!
//! Exactly one session exists per device. This store is the single source of
//! "who is logged in"; dependents (permission cache driver, channel
//! supervisor) subscribe to its watch channel instead of polling or reading
//! ambient globals.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use staffroom_auth::{StaffIdentity, StaffProfile};

use crate::storage::SessionStorage;

/// Opaque bearer credential for the session.
///
/// `Debug` is redacted so tokens cannot leak through logs or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// The authenticated session of this device.
///
/// The canonical role inside `identity` is frozen at login; a role
/// reassignment on the server requires a re-login to take effect, even though
/// the role's permission set may change live underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: StaffIdentity,
    pub credential: AuthToken,
    pub created_at: DateTime<Utc>,
}

/// Owner of the session, with persistence and change notification.
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    storage: SessionStorage,
    changes: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new(storage: SessionStorage) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            current: RwLock::new(None),
            storage,
            changes,
        }
    }

    /// Rehydrate from the persisted record, once at process start.
    ///
    /// A record that decodes but carries no canonical role (corrupted or
    /// legacy blob) is invalid: the store forces a logout instead of running
    /// with an undefined role, because an undefined role must never read as
    /// elevated access.
    pub fn restore(&self) -> Option<Session> {
        let session = self.storage.load()?;

        if session.identity.role.as_str().is_empty() {
            tracing::warn!("persisted session lacks a canonical role; forcing logout");
            self.storage.clear();
            return None;
        }

        *self.write_current() = Some(session.clone());
        let _ = self.changes.send(Some(session.clone()));
        tracing::info!(role = %session.identity.role, "session restored");
        Some(session)
    }

    /// Establish a session.
    ///
    /// Login without an identity is a no-op that logs a warning and leaves
    /// the previous state untouched. Otherwise the canonical role is frozen
    /// in, the record is persisted, and dependents are notified.
    pub fn login(&self, profile: Option<StaffProfile>, credential: AuthToken) -> Option<Session> {
        let Some(profile) = profile else {
            tracing::warn!("login called without an identity; session unchanged");
            return None;
        };

        let session = Session {
            identity: profile.into_identity(),
            credential,
            created_at: Utc::now(),
        };

        if let Err(err) = self.storage.save(&session) {
            // The in-memory session still stands; only the restart path is lost.
            tracing::warn!("failed to persist session: {err:#}");
        }

        *self.write_current() = Some(session.clone());
        let _ = self.changes.send(Some(session.clone()));
        tracing::info!(
            staff = %session.identity.staff_id,
            role = %session.identity.role,
            "logged in"
        );
        Some(session)
    }

    /// Clear the session and its persisted record. Idempotent.
    pub fn logout(&self) {
        let previous = self.write_current().take();
        self.storage.clear();

        if previous.is_some() {
            let _ = self.changes.send(None);
            tracing::info!("logged out");
        }
    }

    /// Synchronous read of the current session.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Subscription for dependents; the payload is the session as of the
    /// latest transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }

    fn write_current(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffroom_auth::{RoleCode, StaffRole};
    use staffroom_core::StaffId;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("staffroom-session-{}", uuid::Uuid::now_v7()))
    }

    fn store_in(dir: PathBuf) -> SessionStore {
        SessionStore::new(SessionStorage::new(Some(dir)).unwrap())
    }

    fn transport_profile() -> StaffProfile {
        StaffProfile {
            staff_id: StaffId::new(),
            display_name: "Priya Anand".to_string(),
            raw_role: RoleCode::new("ROLE_TRANSPORT_INCHARGE"),
        }
    }

    #[test]
    fn login_freezes_canonical_role_and_notifies() {
        let store = store_in(temp_dir());
        let mut changes = store.subscribe();

        let session = store
            .login(Some(transport_profile()), AuthToken::new("tok-1"))
            .unwrap();
        assert_eq!(session.identity.role, StaffRole::Transport);
        assert_eq!(store.current(), Some(session));
        assert!(changes.has_changed().unwrap());
    }

    #[test]
    fn login_without_identity_is_a_noop() {
        let store = store_in(temp_dir());
        let mut changes = store.subscribe();

        assert!(store.login(None, AuthToken::new("tok-1")).is_none());
        assert_eq!(store.current(), None);
        assert!(!changes.has_changed().unwrap());
    }

    #[test]
    fn logout_is_idempotent() {
        let store = store_in(temp_dir());
        store.login(Some(transport_profile()), AuthToken::new("tok-1"));

        store.logout();
        assert_eq!(store.current(), None);

        let mut changes = store.subscribe();
        store.logout();
        assert_eq!(store.current(), None);
        assert!(!changes.has_changed().unwrap());
    }

    #[test]
    fn restore_round_trips_a_persisted_session() {
        let dir = temp_dir();

        let first = store_in(dir.clone());
        let session = first
            .login(Some(transport_profile()), AuthToken::new("tok-1"))
            .unwrap();
        drop(first);

        let second = store_in(dir);
        let restored = second.restore().unwrap();
        assert_eq!(restored.identity, session.identity);
        assert_eq!(restored.credential, session.credential);
        assert_eq!(second.current(), Some(restored));
    }

    #[test]
    fn restore_without_canonical_role_forces_logout() {
        let dir = temp_dir();
        let storage = SessionStorage::new(Some(dir.clone())).unwrap();

        // Legacy blob shape: identity and token present, role field missing.
        let record = format!(
            r#"{{
                "staff_id": "{}",
                "display_name": "Priya Anand",
                "raw_role": "ROLE_TRANSPORT_INCHARGE",
                "token": "tok-1",
                "created_at": "2026-01-05T08:30:00Z"
            }}"#,
            uuid::Uuid::now_v7()
        );
        std::fs::write(storage.blob_path(), record).unwrap();

        let store = store_in(dir);
        assert!(store.restore().is_none());
        assert_eq!(store.current(), None);
        assert!(!storage.blob_path().exists());
    }

    #[test]
    fn auth_token_debug_is_redacted() {
        let token = AuthToken::new("very-secret");
        assert_eq!(format!("{token:?}"), "AuthToken(<redacted>)");
    }
}
