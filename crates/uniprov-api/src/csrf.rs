// CSRF token derivation
//
// UniFi OS hands out a JWT in the `TOKEN` cookie whose payload carries the
// anti-forgery value the proxy expects back in `x-csrf-token`. The token is
// never stored: it is recomputed from the cookie jar for every request so a
// rotated cookie is picked up immediately.

use base64::prelude::*;
use serde::Deserialize;

/// Name of the session cookie holding the signed token.
pub const TOKEN_COOKIE: &str = "TOKEN";

#[derive(Deserialize)]
struct TokenPayload {
    #[serde(rename = "CSRFToken", alias = "csrfToken", default)]
    csrf_token: Option<String>,
}

/// Extract the CSRF token from a `Cookie` header value
/// (`"a=1; TOKEN=h.p.s; b=2"`).
///
/// Returns `None` when the cookie is missing or its value is not a
/// well-formed token.
pub fn from_cookie_header(header: &str) -> Option<String> {
    let value = header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == TOKEN_COOKIE).then_some(value)
    })?;
    from_token(value)
}

/// Extract the CSRF token from a `header.payload.signature` token.
///
/// The payload is unpadded base64 (URL-safe alphabet, standard accepted)
/// wrapping a JSON object with a non-empty `CSRFToken` field.
pub fn from_token(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return None;
    };

    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| BASE64_STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let payload: TokenPayload = serde_json::from_slice(&decoded).ok()?;

    payload.csrf_token.filter(|t| !t.is_empty())
}
