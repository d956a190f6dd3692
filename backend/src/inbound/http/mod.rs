//! Inbound HTTP adapter: handlers, extractors, and the error envelope.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod invitations;
pub mod state;
pub mod uploads;
pub mod validation;

pub use error::{ApiError, ApiResult};
pub use state::HttpState;
