//! Event-invitation backend.
//!
//! Hexagonal layout: `domain` holds entities and ports, `inbound::http` the
//! REST surface, `outbound` the document-store and object-store adapters,
//! and `server` the configuration and route assembly that `main` wires
//! together.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::{Trace, TraceId};
