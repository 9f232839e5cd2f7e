//! Persisted session blob.
//!
//! One JSON record under one well-known file name, read once at process
//! start. The on-disk shape is decoded leniently (a missing role becomes the
//! empty string); deciding what to do with a role-less record is the session
//! store's job, not the codec's.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use staffroom_auth::{RoleCode, StaffIdentity, StaffRole};
use staffroom_core::StaffId;

use crate::session::{AuthToken, Session};

const SESSION_FILE: &str = "session.json";

/// On-disk shape of the session record.
///
/// No `Debug` on purpose: the record contains the bearer token.
#[derive(Clone, Serialize, Deserialize)]
struct PersistedSession {
    staff_id: StaffId,
    display_name: String,
    raw_role: String,
    #[serde(default)]
    role: String,
    token: String,
    created_at: DateTime<Utc>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            staff_id: session.identity.staff_id,
            display_name: session.identity.display_name.clone(),
            raw_role: session.identity.raw_role.as_str().to_string(),
            role: session.identity.role.as_str().to_string(),
            token: session.credential.as_str().to_string(),
            created_at: session.created_at,
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(record: PersistedSession) -> Self {
        Session {
            identity: StaffIdentity {
                staff_id: record.staff_id,
                display_name: record.display_name,
                raw_role: RoleCode::new(record.raw_role),
                role: StaffRole::from(record.role),
            },
            credential: AuthToken::new(record.token),
            created_at: record.created_at,
        }
    }
}

/// File-backed storage for the single session record.
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    /// Storage rooted at `dir`, or at the OS data directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => default_storage_dir()?,
        };

        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create session directory at {dir:?}"))?;

        Ok(Self {
            path: dir.join(SESSION_FILE),
        })
    }

    #[cfg(test)]
    pub(crate) fn blob_path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write the record; pretty JSON so support staff can inspect it.
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        let record = PersistedSession::from(session);
        let json =
            serde_json::to_string_pretty(&record).context("failed to encode session record")?;

        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session record to {:?}", self.path))?;

        tracing::debug!(path = %self.path.display(), "session record saved");
        Ok(())
    }

    /// Read the record. Unreadable or undecodable blobs are logged and read
    /// as "no session".
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("failed to read session record: {err}");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(record) => Some(Session::from(record)),
            Err(err) => {
                tracing::warn!("session record is corrupt: {err}");
                None
            }
        }
    }

    /// Remove the record. Safe to call when none exists.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("session record removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("failed to remove session record: {err}"),
        }
    }
}

fn default_storage_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut home| {
                home.push(".local");
                home.push("share");
                home
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut dir = base;
    dir.push("staffroom");
    Ok(dir)
}
