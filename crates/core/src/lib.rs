//! `staffroom-core` — shared kernel for the staff portal client.
//!
//! This crate contains **pure** primitives (identifiers, error model) with no
//! networking or storage concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::StaffId;
