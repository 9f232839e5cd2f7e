//! `staffroom-auth` — pure authorization boundary (zero-trust, default-deny).
//!
//! This crate is intentionally decoupled from HTTP, push transport and storage:
//! everything here is deterministic and side-effect free, so the session
//! runtime can call it on every render and every cache change.

pub mod access;
pub mod filter;
pub mod identity;
pub mod normalize;
pub mod roles;

pub use access::{ModuleAccess, ModuleKey, PermissionEnvelope, PermissionMap};
pub use filter::{MenuItem, PROFILE_MODULE, module_allowed, visible_menu};
pub use identity::{StaffIdentity, StaffProfile};
pub use normalize::normalize_role;
pub use roles::{RoleCode, StaffRole};
