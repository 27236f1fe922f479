//! Anti-forgery token for the write endpoints.

use std::sync::Arc;

use axum::http::HeaderMap;
use rand::RngExt;

/// Header the editor sends the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Form field accepted as an alternative to the header.
pub const CSRF_FIELD: &str = "authenticity_token";

/// Token every write must present.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(Arc<str>);

impl CsrfToken {
    /// What: Use a configured token, or generate a random one when none is set.
    #[must_use]
    pub fn from_config(configured: Option<&str>) -> Self {
        match configured.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Self(Arc::from(token)),
            None => Self::generate(),
        }
    }

    /// What: Random 32-character hex token.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token: String = (0..16)
            .map(|_| format!("{:02x}", rng.random_range(0..=255_u8)))
            .collect();
        Self(Arc::from(token.as_str()))
    }

    /// What: Token text, as embedded in the host page.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// What: Check the token sent with a write.
    ///
    /// Inputs:
    /// - `headers`: Request headers (checked for [`CSRF_HEADER`] first)
    /// - `field`: Value of the [`CSRF_FIELD`] form field, if any
    ///
    /// Output:
    /// - `true` only when a presented token matches
    #[must_use]
    pub fn verify(&self, headers: &HeaderMap, field: Option<&str>) -> bool {
        let presented = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .or(field);
        presented.is_some_and(|p| constant_time_eq(p.as_bytes(), self.0.as_bytes()))
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

/// Comparison whose duration does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    /// What: Generated tokens are 32 hex characters and differ between calls.
    fn generated_tokens_are_hex() {
        let a = CsrfToken::generate();
        let b = CsrfToken::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    /// What: Header or form field must match; blank config falls back to a random token.
    fn verify_header_or_field() {
        let token = CsrfToken::from_config(Some("secret"));
        let mut headers = HeaderMap::new();
        assert!(!token.verify(&headers, None));
        assert!(token.verify(&headers, Some("secret")));
        headers.insert(CSRF_HEADER, HeaderValue::from_static("wrong"));
        assert!(!token.verify(&headers, Some("secret")));
        headers.insert(CSRF_HEADER, HeaderValue::from_static("secret"));
        assert!(token.verify(&headers, None));

        assert_eq!(CsrfToken::from_config(Some("  ")).as_str().len(), 32);
    }
}
