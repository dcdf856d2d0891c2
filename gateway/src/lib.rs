//! Shopify webhook gateway.
//!
//! Verifies inbound Shopify webhooks (HMAC-SHA256 over the raw request
//! body, base64-compared against the `X-Shopify-Hmac-Sha256` header) and
//! dispatches verified requests to handler routes derived from explicitly
//! registered handler modules.
//!
//! ## Architecture
//!
//! ```text
//! Webhook → signature gate → custom middleware → POST /<module>/<handler>
//! ```
//!
//! Handler modules are registered up front through [`ModuleSet`]; mounting
//! is synchronous and completes before the server accepts its first
//! request. There is no dynamic reload.

pub mod config;
pub mod mount;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use mount::{mount, HandlerModule, ModuleSet};
pub use web::{verify_signature, ComparisonMode, Verdict, SIGNATURE_HEADER};
