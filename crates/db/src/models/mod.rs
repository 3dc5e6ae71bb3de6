//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Where list/detail reads need them, a `*WithCounts` read model that
//!   flattens the entity next to its aggregate columns

pub mod comment;
pub mod organization;
pub mod project;
pub mod stats;
pub mod task;
