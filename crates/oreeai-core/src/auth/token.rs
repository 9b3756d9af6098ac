//! Bearer token inspection.
//!
//! Tokens are JWTs issued by the backend. Only the payload is read here, to
//! recover the signed-in client and the expiry; the signature is the
//! backend's business.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::raw::value_to_string;

/// Claims the dashboard cares about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub client_id: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Expiry, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<f64>,
}

impl TokenClaims {
    pub fn client_id(&self) -> Option<String> {
        self.client_id
            .as_ref()
            .map(value_to_string)
            .filter(|s| !s.is_empty())
    }

    /// A token without `exp` never expires on the client side.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) if exp != 0.0 => exp * 1000.0 < now.timestamp_millis() as f64,
            _ => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decode the payload segment of a JWT.
///
/// Accepts both URL-safe and standard base64 alphabets, with or without
/// padding. Returns `None` for anything that is not a decodable JSON object.
pub fn decode_token_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &Value) -> String {
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_decode_claims() {
        let token = encode_test_token(&json!({
            "client_id": 42,
            "email": "ops@acme.com",
            "company_name": "Acme",
            "exp": 4102444800u64
        }));
        let claims = decode_token_claims(&token).unwrap();
        assert_eq!(claims.client_id().as_deref(), Some("42"));
        assert_eq!(claims.email.as_deref(), Some("ops@acme.com"));
        assert_eq!(claims.company_name.as_deref(), Some("Acme"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_padding_and_standard_alphabet() {
        let claims = json!({ "email": "a?b>c@x.io" });
        let url_safe = URL_SAFE_NO_PAD.encode(claims.to_string());
        let standard = base64::engine::general_purpose::STANDARD.encode(claims.to_string());

        for payload in [url_safe, standard] {
            let token = format!("h.{}.s", payload);
            let decoded = decode_token_claims(&token).unwrap();
            assert_eq!(decoded.email.as_deref(), Some("a?b>c@x.io"));
        }
    }

    #[test]
    fn test_undecodable_tokens() {
        assert_eq!(decode_token_claims("not-a-jwt"), None);
        assert_eq!(decode_token_claims("a.!!!.c"), None);
        let array = URL_SAFE_NO_PAD.encode("[1,2]");
        assert_eq!(decode_token_claims(&format!("a.{}.c", array)), None);
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let past = TokenClaims { exp: Some((now - Duration::minutes(1)).timestamp() as f64), ..Default::default() };
        let future = TokenClaims { exp: Some((now + Duration::hours(1)).timestamp() as f64), ..Default::default() };
        assert!(past.is_expired_at(now));
        assert!(!future.is_expired_at(now));
        assert!(!TokenClaims::default().is_expired_at(now));
    }
}
