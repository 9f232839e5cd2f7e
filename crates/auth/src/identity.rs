//! Authenticated identity types.

use serde::{Deserialize, Serialize};

use staffroom_core::StaffId;

use crate::normalize::normalize_role;
use crate::roles::{RoleCode, StaffRole};

/// Identity as returned by the login endpoint, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub staff_id: StaffId,
    pub display_name: String,
    pub raw_role: RoleCode,
}

/// Identity a session operates under.
///
/// Carries both the verbatim backend code and the canonical role derived from
/// it. The canonical role is computed exactly once, by
/// [`StaffProfile::into_identity`], and stays fixed for the session's
/// lifetime; a role reassignment on the server takes effect at the next
/// login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffIdentity {
    pub staff_id: StaffId,
    pub display_name: String,
    pub raw_role: RoleCode,
    pub role: StaffRole,
}

impl StaffProfile {
    /// Freeze the canonical role into the identity.
    pub fn into_identity(self) -> StaffIdentity {
        let role = normalize_role(self.raw_role.as_str(), None);
        StaffIdentity {
            staff_id: self.staff_id,
            display_name: self.display_name,
            raw_role: self.raw_role,
            role,
        }
    }
}
