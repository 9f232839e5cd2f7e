//! Portal runtime facade.
//!
//! Owns the session store, the permission cache and the per-session sync
//! channel, and exposes the handful of operations the UI shell needs. The
//! channel lifecycle is driven off the session watch: a supervisor task opens
//! one channel per signed-in session and tears it down on logout, so no other
//! code path has to remember to do either.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use staffroom_auth::{MenuItem, ModuleAccess, ModuleKey, PROFILE_MODULE};

use crate::cache::PermissionCache;
use crate::channel::SyncChannel;
use crate::config::PortalConfig;
use crate::fetch::{self, PermissionSource};
use crate::menu::portal_menu;
use crate::rest::{LoginRequest, RestClient, RestError};
use crate::session::{Session, SessionStore};
use crate::storage::SessionStorage;

/// Client-side authorization runtime for one staff portal instance.
pub struct Portal {
    store: Arc<SessionStore>,
    cache: Arc<PermissionCache>,
    source: Arc<dyn PermissionSource>,
    rest: RestClient,
    supervisor: JoinHandle<()>,
}

impl Portal {
    /// Build a portal backed by the real REST client.
    ///
    /// Must be called from within a Tokio runtime; the channel supervisor is
    /// spawned here.
    pub fn new(config: PortalConfig) -> anyhow::Result<Self> {
        let source: Arc<dyn PermissionSource> = Arc::new(RestClient::new(config.api_url.clone()));
        Self::with_source(config, source)
    }

    /// Build a portal with a custom permission source. Login still goes
    /// through the REST client; only permission reads are swapped, which is
    /// the seam tests use.
    pub fn with_source(
        config: PortalConfig,
        source: Arc<dyn PermissionSource>,
    ) -> anyhow::Result<Self> {
        let storage = SessionStorage::new(config.storage_dir.clone())?;
        let store = Arc::new(SessionStore::new(storage));
        let cache = Arc::new(PermissionCache::new());
        let rest = RestClient::new(config.api_url.clone());

        let supervisor = tokio::spawn(supervise(
            store.subscribe(),
            config.channel_url(),
            Arc::clone(&cache),
            Arc::clone(&source),
        ));

        Ok(Self {
            store,
            cache,
            source,
            rest,
            supervisor,
        })
    }

    /// Restore a persisted session, if any, and prime the cache for it.
    pub async fn start(&self) {
        if self.store.restore().is_some() {
            self.refresh_permissions().await;
        }
    }

    /// Exchange credentials for a session and prime the cache.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        role_claim: &str,
    ) -> Result<Session, RestError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            role_claim: role_claim.to_string(),
        };
        let (profile, token) = self.rest.login(&request).await?;

        // Clear before the store swap so the new session never reads a
        // previous session's grants; it reads deny-all until its own fetch
        // lands.
        self.cache.clear();
        let session = self
            .store
            .login(Some(profile), token)
            .ok_or_else(|| RestError::Malformed("login did not establish a session".to_string()))?;
        self.refresh_permissions().await;
        Ok(session)
    }

    /// End the session. Safe to call when already signed out.
    pub fn logout(&self) {
        self.store.logout();
        self.cache.clear();
    }

    pub fn current_session(&self) -> Option<Session> {
        self.store.current()
    }

    /// Menu entries the current session may see, in display order.
    pub fn visible_menu(&self) -> Vec<MenuItem> {
        let session = self.store.current();
        let permissions = self.cache.snapshot();
        let menu = portal_menu();
        staffroom_auth::visible_menu(
            &menu,
            session.as_ref().map(|session| &session.identity),
            &permissions,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    /// Whether the current session may open `key` at all.
    pub fn module_allowed(&self, key: &ModuleKey) -> bool {
        let session = self.store.current();
        staffroom_auth::module_allowed(
            session.as_ref().map(|session| &session.identity),
            &self.cache.snapshot(),
            key,
        )
    }

    /// Full flag set for `key` under the current session.
    ///
    /// Super-users read as a full grant; the profile module always reads as
    /// accessible. Everything else is the cached entry, all-false when
    /// absent.
    pub fn module_access(&self, key: &ModuleKey) -> ModuleAccess {
        let Some(session) = self.store.current() else {
            return ModuleAccess::default();
        };
        if session.identity.role.is_super_user() {
            return ModuleAccess::full();
        }

        let mut access = self.cache.module_access(key);
        if key.as_str() == PROFILE_MODULE {
            access.accessible = true;
        }
        access
    }

    /// Hook for the navigation layer: refresh on every route transition, so
    /// a revoked grant is noticed even if the push channel is down.
    pub async fn handle_navigation(&self, path: &str) {
        tracing::debug!(path = %path, "navigation transition; refreshing permissions");
        self.refresh_permissions().await;
    }

    /// Re-fetch permissions for the current session; `false` when signed out
    /// or when the result was discarded as stale.
    pub async fn refresh_permissions(&self) -> bool {
        // Epoch before session: if a sign-in slips between the two reads,
        // the install is rejected instead of mixing generations.
        let epoch = self.cache.epoch();
        let Some(session) = self.store.current() else {
            return false;
        };
        fetch::refresh_permissions_under(
            &self.cache,
            epoch,
            self.source.as_ref(),
            &session.credential,
        )
        .await
    }

    /// Cache write counter; stable between readings means no refresh landed.
    pub fn permissions_version(&self) -> u64 {
        self.cache.version()
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

/// Keep exactly one sync channel open per signed-in session.
async fn supervise(
    mut sessions: watch::Receiver<Option<Session>>,
    channel_url: String,
    cache: Arc<PermissionCache>,
    source: Arc<dyn PermissionSource>,
) {
    let mut channel: Option<SyncChannel>;

    loop {
        // Latest generation wins: assigning drops the previous channel,
        // which stops its worker.
        channel = match sessions.borrow_and_update().clone() {
            Some(session) => Some(SyncChannel::open(
                channel_url.clone(),
                session.identity,
                session.credential,
                Arc::clone(&cache),
                Arc::clone(&source),
            )),
            None => {
                cache.clear();
                None
            }
        };

        if sessions.changed().await.is_err() {
            break;
        }
    }

    drop(channel);
}
