//! Shopify webhook signature verification.
//!
//! Shopify signs webhook requests with HMAC-SHA256 over the raw request
//! body and sends the base64 digest in the `X-Shopify-Hmac-Sha256` header.
//! Reference: https://shopify.dev/docs/apps/build/webhooks/subscribe/https#step-2-validate-the-origin-of-your-webhook-to-ensure-it-s-coming-from-shopify

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 digest of the raw body.
pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// How the computed digest is compared against the header value.
///
/// Shopify has changed the escaping of forward slashes in the header value
/// at least once, so the comparison is configurable rather than hard-coded.
/// Pick the mode matching the escaping your shop's webhooks currently use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// Compare the base64 digest verbatim.
    #[default]
    Standard,
    /// Replace every `/` in the computed digest with `\/` before comparing,
    /// matching header values with escaped forward slashes.
    EscapedSlash,
}

/// Outcome of signature verification for one request.
///
/// Produced once per request and handed directly to the gate; nothing else
/// reads or stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Verify a Shopify webhook signature.
///
/// Computes `base64(HMAC_SHA256(shared_secret, body))` and compares it
/// against the header value under the given [`ComparisonMode`]. The body
/// must be the raw bytes exactly as received; JSON parsing can reorder or
/// reformat the payload and invalidate the digest.
///
/// A missing header is always `Invalid`. Malformed input of any kind
/// yields `Invalid`, never an error.
pub fn verify_signature(
    shared_secret: &str,
    body: &[u8],
    header: Option<&str>,
    mode: ComparisonMode,
) -> Verdict {
    let Some(header) = header else {
        debug!("signature_header_missing");
        return Verdict::Invalid;
    };

    let mut mac = match HmacSha256::new_from_slice(shared_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            debug!("signature_invalid_key");
            return Verdict::Invalid;
        }
    };

    mac.update(body);

    let digest = BASE64.encode(mac.finalize().into_bytes());

    let expected = match mode {
        ComparisonMode::Standard => digest,
        ComparisonMode::EscapedSlash => escape_slashes(&digest),
    };

    if constant_time_compare(&expected, header) {
        Verdict::Valid
    } else {
        debug!(
            expected_length = expected.len(),
            actual_length = header.len(),
            "signature_mismatch"
        );
        Verdict::Invalid
    }
}

/// Escape forward slashes the way the platform escapes them in the header.
fn escape_slashes(digest: &str) -> String {
    digest.replace('/', "\\/")
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_b64(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_valid_signature() {
        let secret = "test-shared-secret";
        let body = br#"{"id":1234,"topic":"orders/create"}"#;
        let header = digest_b64(secret, body);

        let verdict = verify_signature(secret, body, Some(&header), ComparisonMode::Standard);
        assert_eq!(verdict, Verdict::Valid);
    }

    #[test]
    fn test_verify_missing_header() {
        let verdict = verify_signature("secret", b"body", None, ComparisonMode::Standard);
        assert_eq!(verdict, Verdict::Invalid);
    }

    #[test]
    fn test_verify_wrong_header() {
        let verdict = verify_signature(
            "secret",
            b"body",
            Some("definitely-not-a-digest"),
            ComparisonMode::Standard,
        );
        assert_eq!(verdict, Verdict::Invalid);
    }

    #[test]
    fn test_verify_tampered_body() {
        let secret = "test-shared-secret";
        let header = digest_b64(secret, b"original body");

        let verdict =
            verify_signature(secret, b"originaL body", Some(&header), ComparisonMode::Standard);
        assert_eq!(verdict, Verdict::Invalid);
    }

    #[test]
    fn test_verify_wrong_secret() {
        let header = digest_b64("secret-a", b"body");

        let verdict = verify_signature("secret-b", b"body", Some(&header), ComparisonMode::Standard);
        assert_eq!(verdict, Verdict::Invalid);
    }

    #[test]
    fn test_verify_escaped_slash_mode() {
        let secret = "test-shared-secret";
        let body = br#"{"id":5678}"#;
        let header = escape_slashes(&digest_b64(secret, body));

        let verdict = verify_signature(secret, body, Some(&header), ComparisonMode::EscapedSlash);
        assert_eq!(verdict, Verdict::Valid);
    }

    #[test]
    fn test_escape_slashes() {
        assert_eq!(escape_slashes("abc"), "abc");
        assert_eq!(escape_slashes("a/b/c"), "a\\/b\\/c");
        assert_eq!(escape_slashes("/"), "\\/");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_comparison_mode_default() {
        assert_eq!(ComparisonMode::default(), ComparisonMode::Standard);
    }
}
