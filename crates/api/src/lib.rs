//! Operation boundary and HTTP shell for the workplan backend.
//!
//! Inbound requests are named operations with a map of arguments. Each one
//! runs through the three-stage isolation/permission pipeline before its
//! executor touches the store.

pub mod config;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod routes;
pub mod state;
