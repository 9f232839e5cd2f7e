//! `staffroom-portal` — async client runtime for the staff portal.
//!
//! Owns the session lifecycle, the permission cache and the push channel, and
//! composes them with the pure policy in `staffroom-auth`. The host shell
//! embeds [`Portal`] and treats it as the only authority on "who is logged in
//! and what may they see"; the server independently re-checks every call.

pub mod cache;
pub mod channel;
pub mod config;
pub mod fetch;
pub mod menu;
pub mod portal;
pub mod rest;
pub mod session;
pub mod storage;

pub use cache::{CacheEpoch, PermissionCache};
pub use channel::{ChannelEvent, SyncChannel, concerns_session};
pub use config::PortalConfig;
pub use fetch::{
    PermissionSource, decode_permission_envelope, refresh_permissions, refresh_permissions_under,
};
pub use menu::portal_menu;
pub use portal::Portal;
pub use rest::{LoginRequest, RestClient, RestError};
pub use session::{AuthToken, Session, SessionStore};
pub use storage::SessionStorage;
