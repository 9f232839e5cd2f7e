//! Permission fetching, kept separate from cache writes.
//!
//! A [`PermissionSource`] produces a map and nothing else; deciding whether
//! that map may still be installed is [`refresh_permissions`]'s job. Fetch
//! failures of any kind degrade to the empty map, which denies everything.

use async_trait::async_trait;

use staffroom_auth::{PermissionEnvelope, PermissionMap};

use crate::cache::{CacheEpoch, PermissionCache};
use crate::session::AuthToken;

/// Something that can produce the permission map for a credential.
///
/// Implementations must not panic on transport or decode failures; they
/// return the empty map instead.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn fetch_permissions(&self, credential: &AuthToken) -> PermissionMap;
}

/// Decode a permission response body, degrading to the empty map.
pub fn decode_permission_envelope(body: &str) -> PermissionMap {
    match serde_json::from_str::<PermissionEnvelope>(body) {
        Ok(envelope) if envelope.success => envelope.data,
        Ok(_) => {
            tracing::warn!("permission endpoint reported failure; treating as no permissions");
            PermissionMap::new()
        }
        Err(err) => {
            tracing::warn!("malformed permission response: {err}");
            PermissionMap::new()
        }
    }
}

/// Fetch from `source` and install into `cache`, provided `epoch` is still
/// current when the response arrives.
///
/// Callers holding a credential for one session generation (the sync
/// channel) capture the epoch with the credential and pass it here, so a
/// fetch issued for an ended generation can never land. Returns `false`
/// when the result was discarded.
pub async fn refresh_permissions_under(
    cache: &PermissionCache,
    epoch: CacheEpoch,
    source: &dyn PermissionSource,
    credential: &AuthToken,
) -> bool {
    let map = source.fetch_permissions(credential).await;
    cache.install(epoch, map)
}

/// Fetch and install under the epoch observed at call time.
///
/// If the cache is cleared while the fetch is in flight (logout, or a newer
/// session), the result is discarded and this returns `false`.
pub async fn refresh_permissions(
    cache: &PermissionCache,
    source: &dyn PermissionSource,
    credential: &AuthToken,
) -> bool {
    refresh_permissions_under(cache, cache.epoch(), source, credential).await
}
