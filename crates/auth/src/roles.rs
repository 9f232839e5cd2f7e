use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Raw role code as issued by the backend.
///
/// Codes are intentionally opaque strings at this layer; live role tables
/// contain free-form values like `"ROLE_TRANSPORT_INCHARGE"` that only the
/// normalizer interprets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(Cow<'static, str>);

impl RoleCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical role a session operates under.
///
/// The set is closed; raw codes that map to no member resolve to
/// [`StaffRole::Other`] carrying the original text. `Other` is a recording
/// sentinel, never an elevated role: it fails every super-user check and the
/// permission map is the only thing that can grant it access.
///
/// Serialized as the plain role name string so persisted sessions and wire
/// payloads stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StaffRole {
    Admin,
    Director,
    FrontDesk,
    Accounts,
    Transport,
    DataEntry,
    Teacher,
    Librarian,
    /// Unmapped raw code, carried verbatim.
    Other(String),
}

impl StaffRole {
    /// The closed canonical set, in no significant order.
    pub const CANONICAL: &'static [StaffRole] = &[
        StaffRole::Admin,
        StaffRole::Director,
        StaffRole::FrontDesk,
        StaffRole::Accounts,
        StaffRole::Transport,
        StaffRole::DataEntry,
        StaffRole::Teacher,
        StaffRole::Librarian,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            StaffRole::Admin => "ADMIN",
            StaffRole::Director => "DIRECTOR",
            StaffRole::FrontDesk => "FRONT_DESK",
            StaffRole::Accounts => "ACCOUNTS",
            StaffRole::Transport => "TRANSPORT",
            StaffRole::DataEntry => "DATA_ENTRY",
            StaffRole::Teacher => "TEACHER",
            StaffRole::Librarian => "LIBRARIAN",
            StaffRole::Other(code) => code,
        }
    }

    /// Exact lookup against the canonical names. No heuristics here; fuzzy
    /// matching lives in [`crate::normalize::normalize_role`].
    pub fn from_canonical_name(name: &str) -> Option<StaffRole> {
        StaffRole::CANONICAL
            .iter()
            .find(|role| role.as_str() == name)
            .cloned()
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, StaffRole::Other(_))
    }

    /// Membership in the fixed super-user set.
    ///
    /// Pure and evaluated fresh on every access check; bypass status is a
    /// property of the role value itself and is never cached.
    pub fn is_super_user(&self) -> bool {
        matches!(self, StaffRole::Admin | StaffRole::Director)
    }
}

impl From<String> for StaffRole {
    fn from(value: String) -> Self {
        StaffRole::from_canonical_name(&value).unwrap_or(StaffRole::Other(value))
    }
}

impl From<StaffRole> for String {
    fn from(value: StaffRole) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for role in StaffRole::CANONICAL {
            assert_eq!(
                StaffRole::from_canonical_name(role.as_str()),
                Some(role.clone())
            );
        }
    }

    #[test]
    fn unknown_name_is_not_canonical() {
        assert_eq!(StaffRole::from_canonical_name("WAREHOUSE"), None);
    }

    #[test]
    fn super_user_set_is_admin_and_director_only() {
        let supers: Vec<&StaffRole> = StaffRole::CANONICAL
            .iter()
            .filter(|r| r.is_super_user())
            .collect();
        assert_eq!(supers, vec![&StaffRole::Admin, &StaffRole::Director]);
        assert!(!StaffRole::Other("ADMIN_ISH".to_string()).is_super_user());
    }

    #[test]
    fn serde_round_trips_canonical_and_other() {
        let json = serde_json::to_string(&StaffRole::FrontDesk).unwrap();
        assert_eq!(json, "\"FRONT_DESK\"");
        assert_eq!(
            serde_json::from_str::<StaffRole>("\"FRONT_DESK\"").unwrap(),
            StaffRole::FrontDesk
        );

        let other: StaffRole = serde_json::from_str("\"ROLE_CUSTOM_77\"").unwrap();
        assert_eq!(other, StaffRole::Other("ROLE_CUSTOM_77".to_string()));
        assert_eq!(
            serde_json::to_string(&other).unwrap(),
            "\"ROLE_CUSTOM_77\""
        );
    }
}
