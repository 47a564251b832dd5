use axum::http::{HeaderMap, header};
use constant_time_eq::constant_time_eq;

/// Pull the credential out of the `Authorization` header. Both
/// `Bearer <token>` (any casing of the scheme) and a bare `<token>` are
/// accepted; existing callers send either form.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    Some(strip_bearer(raw))
}

fn strip_bearer(value: &str) -> &str {
    const SCHEME: &[u8] = b"bearer ";
    let bytes = value.as_bytes();
    if bytes.len() > SCHEME.len() && bytes[..SCHEME.len()].eq_ignore_ascii_case(SCHEME) {
        // The prefix is pure ASCII, so slicing at its length is safe.
        value[SCHEME.len()..].trim()
    } else {
        value
    }
}

/// Check the request credential against the configured secret.
///
/// Comparison is constant-time to avoid leaking the secret through timing.
/// An unset or empty secret rejects everything: this service is never meant
/// to run open.
pub fn authorize(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };
    let Some(token) = extract_token(headers) else {
        return false;
    };
    constant_time_eq(token.as_bytes(), secret.as_bytes())
}
