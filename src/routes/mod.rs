//! Route composition

pub mod webhooks;
