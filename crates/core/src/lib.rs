//! Pure domain logic for the workplan backend.
//!
//! No I/O lives here: entity value types, status state machines, field and
//! cross-field validation, slug derivation, and statistics arithmetic. The
//! `workplan-db` crate calls into this layer before every write; the
//! `workplan-api` crate uses it for derived read-model fields.

pub mod email;
pub mod error;
pub mod organization;
pub mod project;
pub mod slug;
pub mod stats;
pub mod task;
pub mod types;
pub mod validate;
