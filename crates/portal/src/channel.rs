//! Push channel that keeps cached permissions fresh.
//!
//! One websocket per signed-in session. The channel never mutates the cache
//! from event payloads; a relevant event only triggers a re-fetch through the
//! same guarded path every other refresh uses. Connection loss is routine
//! (laptops sleep, school wifi drops), so the worker reconnects forever with
//! capped backoff until it is told to stop.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use staffroom_auth::StaffIdentity;

use crate::cache::{CacheEpoch, PermissionCache};
use crate::fetch::{refresh_permissions_under, PermissionSource};
use crate::session::AuthToken;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Event pushed by the backend on its auth stream.
///
/// Unrecognized event types decode as [`ChannelEvent::Unknown`] so new server
/// events never kill the connection loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelEvent {
    RoleUpdated {
        #[serde(rename = "roleId")]
        role_id: String,
    },
    #[serde(other)]
    Unknown,
}

/// Whether `event` affects the signed-in staff member.
///
/// The backend broadcasts role updates to every connected client; each client
/// reacts only when the updated role is its own. The identifier is matched
/// against both the verbatim backend code and the canonical name, case
/// insensitively, because deployments have been seen emitting either.
pub fn concerns_session(event: &ChannelEvent, identity: &StaffIdentity) -> bool {
    match event {
        ChannelEvent::RoleUpdated { role_id } => {
            role_id.eq_ignore_ascii_case(identity.raw_role.as_str())
                || role_id.eq_ignore_ascii_case(identity.role.as_str())
        }
        ChannelEvent::Unknown => false,
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Handle to the per-session channel worker.
pub struct SyncChannel {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl SyncChannel {
    /// Spawn the worker for one session. The worker runs until [`close`] or
    /// drop.
    ///
    /// The worker is pinned to the cache epoch current at open: once the
    /// cache is cleared for a logout or a newer session, its refreshes can
    /// no longer land, even if teardown has not reached it yet.
    ///
    /// [`close`]: SyncChannel::close
    pub fn open(
        url: String,
        identity: StaffIdentity,
        credential: AuthToken,
        cache: Arc<PermissionCache>,
        source: Arc<dyn PermissionSource>,
    ) -> Self {
        let shutdown = Arc::new(Notify::new());
        let epoch = cache.epoch();
        let handle = tokio::spawn(run_channel(
            url,
            identity,
            credential,
            cache,
            epoch,
            source,
            Arc::clone(&shutdown),
        ));
        Self { shutdown, handle }
    }

    /// Ask the worker to stop; idempotent.
    pub fn close(&self) {
        self.shutdown.notify_one();
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        self.close();
        self.handle.abort();
    }
}

async fn run_channel(
    url: String,
    identity: StaffIdentity,
    credential: AuthToken,
    cache: Arc<PermissionCache>,
    epoch: CacheEpoch,
    source: Arc<dyn PermissionSource>,
    shutdown: Arc<Notify>,
) {
    let mut backoff = INITIAL_BACKOFF;
    tracing::info!(url = %url, "sync channel started");

    loop {
        let connected = tokio::select! {
            _ = shutdown.notified() => break,
            result = connect_async(url.as_str()) => result,
        };

        let stream = match connected {
            Ok((stream, _)) => stream,
            Err(err) => {
                tracing::warn!("sync channel connect failed: {err}; retrying in {backoff:?}");
                tokio::select! {
                    _ = shutdown.notified() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        tracing::info!("sync channel connected");
        backoff = INITIAL_BACKOFF;

        // A push may have been missed while disconnected; resync once per
        // (re)connect rather than trusting the gap was quiet.
        refresh_permissions_under(&cache, epoch, source.as_ref(), &credential).await;

        let stopped = drain_messages(
            stream,
            &identity,
            &credential,
            &cache,
            epoch,
            source.as_ref(),
            &shutdown,
        )
        .await;
        if stopped {
            break;
        }
        tracing::warn!("sync channel disconnected; reconnecting");
    }

    tracing::info!("sync channel stopped");
}

/// Pump messages until the stream ends or shutdown is requested.
///
/// Returns `true` when the loop ended because of shutdown.
async fn drain_messages(
    mut stream: WsStream,
    identity: &StaffIdentity,
    credential: &AuthToken,
    cache: &PermissionCache,
    epoch: CacheEpoch,
    source: &dyn PermissionSource,
    shutdown: &Notify,
) -> bool {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                let _ = stream.send(Message::Close(None)).await;
                return true;
            }
            message = stream.next() => match message {
                None => return false,
                Some(Ok(Message::Text(text))) => {
                    handle_text(&text, identity, credential, cache, epoch, source).await;
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = stream.send(Message::Pong(payload)).await;
                }
                Some(Ok(Message::Close(_))) => return false,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!("sync channel read failed: {err}");
                    return false;
                }
            }
        }
    }
}

async fn handle_text(
    text: &str,
    identity: &StaffIdentity,
    credential: &AuthToken,
    cache: &PermissionCache,
    epoch: CacheEpoch,
    source: &dyn PermissionSource,
) {
    let event = match serde_json::from_str::<ChannelEvent>(text) {
        Ok(event) => event,
        Err(err) => {
            tracing::debug!("ignoring undecodable channel message: {err}");
            return;
        }
    };

    if concerns_session(&event, identity) {
        tracing::info!(role = %identity.role.as_str(), "role permissions changed; refreshing");
        refresh_permissions_under(cache, epoch, source, credential).await;
    } else {
        tracing::debug!("ignoring event for another role");
    }
}
