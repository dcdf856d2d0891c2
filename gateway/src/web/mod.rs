//! Web layer for the webhook gateway.
//!
//! This module provides the per-request half of the gateway:
//! - Raw-body HMAC-SHA256 signature verification
//! - The verdict gate that rejects unverified requests with 403
//! - The health endpoint
//!
//! Route assembly lives in [`crate::mount`].

pub mod gate;
pub mod handlers;
pub mod signature;

pub use gate::{require_valid_signature, GatewayState};
pub use handlers::{health, HealthResponse};
pub use signature::{verify_signature, ComparisonMode, Verdict, SIGNATURE_HEADER};
