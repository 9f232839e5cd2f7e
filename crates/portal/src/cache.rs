//! In-memory permission cache.
//!
//! Holds one [`PermissionMap`] at a time; a refresh replaces the whole map
//! rather than patching entries, so readers never see a half-updated view.
//! Every clear advances an epoch, and an install carrying an older epoch is
//! discarded. That is what keeps a logout-then-fetch race from resurrecting
//! permissions for a session that no longer exists.

use std::sync::RwLock;

use staffroom_auth::{ModuleAccess, ModuleKey, PermissionMap};

/// Epoch captured before a fetch and checked again at install time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheEpoch(u64);

#[derive(Default)]
struct CacheInner {
    map: PermissionMap,
    epoch: u64,
    version: u64,
}

/// Concurrent-safe store for the current session's module permissions.
#[derive(Default)]
pub struct PermissionCache {
    inner: RwLock<CacheInner>,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch to pair with [`PermissionCache::install`].
    pub fn epoch(&self) -> CacheEpoch {
        CacheEpoch(self.read().epoch)
    }

    /// Swap in a freshly fetched map.
    ///
    /// Returns `false` without touching the cache when `epoch` is no longer
    /// current, which means a clear happened while the fetch was in flight.
    pub fn install(&self, epoch: CacheEpoch, map: PermissionMap) -> bool {
        let mut inner = self.write();
        if inner.epoch != epoch.0 {
            tracing::debug!("discarding stale permission fetch result");
            return false;
        }
        inner.map = map;
        inner.version += 1;
        true
    }

    /// Drop all cached permissions and invalidate in-flight fetches.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.map = PermissionMap::new();
        inner.epoch += 1;
        inner.version += 1;
    }

    /// Whether `key` is cached as accessible. Absent keys read as denied.
    pub fn module_allowed(&self, key: &ModuleKey) -> bool {
        self.read().map.allows(key)
    }

    /// Full flag set for `key`; all-false when the key is absent.
    pub fn module_access(&self, key: &ModuleKey) -> ModuleAccess {
        self.read().map.access(key)
    }

    /// Clone of the current map, for the menu filter.
    pub fn snapshot(&self) -> PermissionMap {
        self.read().map.clone()
    }

    /// Counts accepted writes. Two equal readings with time in between mean
    /// no refresh landed.
    pub fn version(&self) -> u64 {
        self.read().version
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheInner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheInner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
