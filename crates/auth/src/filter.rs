//! Navigation access filter.
//!
//! Pure policy over (menu descriptor, session, permission map). The runtime
//! calls this on every render and after every cache change; nothing here may
//! touch state or perform IO.

use std::borrow::Cow;

use crate::access::{ModuleKey, PermissionMap};
use crate::identity::StaffIdentity;

/// Module key of the self-service account page, visible to every session.
pub const PROFILE_MODULE: &str = "profile";

/// Entry of the static, compiled-in menu descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub path: Cow<'static, str>,
    pub label: Cow<'static, str>,
    pub module: ModuleKey,
}

impl MenuItem {
    pub fn new(
        path: impl Into<Cow<'static, str>>,
        label: impl Into<Cow<'static, str>>,
        module: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            module: ModuleKey::new(module),
        }
    }
}

/// Compute the menu subset a session may see.
///
/// Rules, applied in order:
/// 1. no session: empty, the unauthenticated state navigates nowhere;
/// 2. super-user canonical role: everything (bypass, checked fresh against
///    the role value on every call);
/// 3. the profile module: always allowed;
/// 4. otherwise allowed iff the map holds `accessible == true` for the item's
///    module. Absent entries deny; there is no implicit allow for unlisted
///    modules, so a role with nothing configured sees the profile page only.
///
/// - No IO
/// - No panics
pub fn visible_menu<'m>(
    menu: &'m [MenuItem],
    session: Option<&StaffIdentity>,
    permissions: &PermissionMap,
) -> Vec<&'m MenuItem> {
    let Some(identity) = session else {
        return Vec::new();
    };

    if identity.role.is_super_user() {
        return menu.iter().collect();
    }

    menu.iter()
        .filter(|item| item.module.as_str() == PROFILE_MODULE || permissions.allows(&item.module))
        .collect()
}

/// Single-module capability check, same rule order as [`visible_menu`].
pub fn module_allowed(
    session: Option<&StaffIdentity>,
    permissions: &PermissionMap,
    key: &ModuleKey,
) -> bool {
    let Some(identity) = session else {
        return false;
    };

    identity.role.is_super_user() || key.as_str() == PROFILE_MODULE || permissions.allows(key)
}
