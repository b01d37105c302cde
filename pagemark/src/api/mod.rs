//! HTTP API layer: request/response models and axum handlers.
//!
//! Handlers are thin: the access control gate has already made the
//! authorization decision by the time a handler runs, so handlers only
//! validate input, call a repository, and wrap the result in the JSON
//! success envelope.

pub mod handlers;
pub mod models;
