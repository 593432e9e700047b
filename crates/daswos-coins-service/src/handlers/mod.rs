//! HTTP request handlers.

pub mod coins;
pub mod health;
pub mod webhooks;
