//! Vendor call-control integration
//!
//! Everything that talks the vendor's language lives here:
//! - `client` - reqwest client for the call-control API (transfer)
//! - `token` - application JWT generation for backend requests
//! - `ncco` - call control object model (connect/stream/record/talk)
//! - `error` - client and token error types

pub mod client;
pub mod error;
pub mod ncco;
pub mod token;

pub use client::CallControlClient;
pub use error::{CallControlError, TokenError};
pub use ncco::{ConnectEndpoint, NccoAction};
pub use token::{ApplicationTokenProvider, StaticTokenProvider, TokenProvider};
