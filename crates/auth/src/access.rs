//! Module permission model.
//!
//! The server is the source of truth for what each role may touch; the client
//! holds a verbatim copy keyed by module and treats every gap as a denial.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key of a navigable feature area (e.g. `"students"`, `"fees"`).
///
/// Doubles as the menu-item attribute and the permission-map key the server
/// configures per role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleKey(Cow<'static, str>);

impl ModuleKey {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-module grant flags as configured server-side.
///
/// Every flag the wire omits deserializes to `false`: a half-written entry
/// can narrow access, never widen it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleAccess {
    pub accessible: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl ModuleAccess {
    /// Full grant, as the server emits for owning roles.
    pub fn full() -> Self {
        Self {
            accessible: true,
            can_create: true,
            can_update: true,
            can_delete: true,
        }
    }

    /// View-only grant.
    pub fn read_only() -> Self {
        Self {
            accessible: true,
            ..Self::default()
        }
    }
}

/// Server-authoritative permission map.
///
/// A map that has never been fetched is the empty map, and the empty map
/// denies everything. Lookups for unknown keys deny. There is no merge
/// operation on purpose; refreshes replace the whole value (atomic swap
/// happens at the cache layer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(HashMap<ModuleKey, ModuleAccess>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ModuleKey, access: ModuleAccess) {
        self.0.insert(key, access);
    }

    /// Whether the module is reachable at all. Absent key means `false`.
    pub fn allows(&self, key: &ModuleKey) -> bool {
        self.0.get(key).is_some_and(|access| access.accessible)
    }

    /// Flag set for the module; all-false for absent keys.
    pub fn access(&self, key: &ModuleKey) -> ModuleAccess {
        self.0.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ModuleKey, ModuleAccess)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (ModuleKey, ModuleAccess)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Wire envelope of the permission read endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: PermissionMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_denies() {
        let map = PermissionMap::new();
        assert!(!map.allows(&ModuleKey::new("students")));
        assert_eq!(map.access(&ModuleKey::new("students")), ModuleAccess::default());
    }

    #[test]
    fn inaccessible_entry_denies() {
        let mut map = PermissionMap::new();
        map.insert(ModuleKey::new("fees"), ModuleAccess::default());
        assert!(!map.allows(&ModuleKey::new("fees")));
    }

    #[test]
    fn accessible_entry_allows() {
        let mut map = PermissionMap::new();
        map.insert(ModuleKey::new("fees"), ModuleAccess::read_only());
        assert!(map.allows(&ModuleKey::new("fees")));
        assert!(!map.access(&ModuleKey::new("fees")).can_delete);
    }

    #[test]
    fn missing_wire_flags_default_to_deny() {
        let access: ModuleAccess =
            serde_json::from_str(r#"{ "accessible": true, "canUpdate": true }"#).unwrap();
        assert!(access.accessible);
        assert!(access.can_update);
        assert!(!access.can_create);
        assert!(!access.can_delete);
    }

    #[test]
    fn envelope_decodes_with_and_without_data() {
        let body = r#"{
            "success": true,
            "data": {
                "students": { "accessible": true, "canCreate": true },
                "fees": { "accessible": false }
            }
        }"#;
        let envelope: PermissionEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 2);
        assert!(envelope.data.allows(&ModuleKey::new("students")));
        assert!(!envelope.data.allows(&ModuleKey::new("fees")));

        let bare: PermissionEnvelope = serde_json::from_str(r#"{ "success": false }"#).unwrap();
        assert!(!bare.success);
        assert!(bare.data.is_empty());
    }
}
