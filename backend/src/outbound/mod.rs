//! Outbound adapters implementing the domain ports.

pub mod object_store;
pub mod persistence;
