//! VAPID request signing (RFC 8292).
//!
//! Builds the `Authorization: vapid t=<jwt>, k=<public-key>` header proving
//! the application server's identity to the push service.

use chrono::Utc;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::Signature;
use serde_json::json;
use url::Url;

use crate::WebPushError;
use crate::keys::{VapidKeys, b64url_encode};

/// Token lifetime. Push services cap this at 24 hours.
const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

/// Signs push requests with a fixed server identity.
#[derive(Debug, Clone)]
pub struct VapidSigner {
    keys: VapidKeys,
    contact: String,
}

impl VapidSigner {
    /// Create a signer from server-held keys and a contact URI
    /// (`mailto:` or `https:`).
    pub fn new(keys: VapidKeys, contact: String) -> Self {
        Self { keys, contact }
    }

    /// Base64url public key, exposed to clients as the application server key.
    pub fn public_key_b64(&self) -> &str {
        self.keys.public_key_b64()
    }

    /// Build the `Authorization` header value for a push endpoint.
    ///
    /// The JWT audience is the endpoint origin, not the full URL.
    pub fn authorization(&self, endpoint: &Url) -> Result<String, WebPushError> {
        let aud = endpoint.origin().ascii_serialization();
        if aud == "null" {
            return Err(WebPushError::InvalidKey(format!(
                "endpoint {endpoint} has no origin"
            )));
        }

        let header = b64url_encode(br#"{"typ":"JWT","alg":"ES256"}"#);
        let claims = json!({
            "aud": aud,
            "exp": Utc::now().timestamp() + TOKEN_LIFETIME_SECS,
            "sub": self.contact,
        });
        let claims = b64url_encode(claims.to_string().as_bytes());

        let signing_input = format!("{header}.{claims}");
        let signature: Signature = self.keys.signing_key().sign(signing_input.as_bytes());
        let jwt = format!("{signing_input}.{}", b64url_encode(&signature.to_bytes()));

        Ok(format!("vapid t={jwt}, k={}", self.keys.public_key_b64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::b64url_decode;
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::VerifyingKey;

    fn signer() -> VapidSigner {
        VapidSigner::new(VapidKeys::generate(), "mailto:hi@6040.work".into())
    }

    #[test]
    fn header_shape() {
        let signer = signer();
        let endpoint = Url::parse("https://push.example/abc/def").unwrap();
        let header = signer.authorization(&endpoint).unwrap();

        assert!(header.starts_with("vapid t="));
        let (token, key) = header
            .trim_start_matches("vapid t=")
            .split_once(", k=")
            .unwrap();
        assert_eq!(key, signer.public_key_b64());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn claims_carry_origin_and_contact() {
        let signer = signer();
        let endpoint = Url::parse("https://push.example:8443/abc").unwrap();
        let header = signer.authorization(&endpoint).unwrap();
        let token = header
            .trim_start_matches("vapid t=")
            .split(", k=")
            .next()
            .unwrap();

        let claims_b64 = token.split('.').nth(1).unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&b64url_decode(claims_b64).unwrap()).unwrap();
        assert_eq!(claims["aud"], "https://push.example:8443");
        assert_eq!(claims["sub"], "mailto:hi@6040.work");
        assert!(claims["exp"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn signature_verifies_with_public_key() {
        let signer = signer();
        let endpoint = Url::parse("https://push.example/abc").unwrap();
        let header = signer.authorization(&endpoint).unwrap();
        let token = header
            .trim_start_matches("vapid t=")
            .split(", k=")
            .next()
            .unwrap();

        let mut parts = token.split('.');
        let signing_input = format!(
            "{}.{}",
            parts.next().unwrap(),
            parts.next().unwrap()
        );
        let signature =
            Signature::from_slice(&b64url_decode(parts.next().unwrap()).unwrap()).unwrap();

        let point = b64url_decode(signer.public_key_b64()).unwrap();
        let verifying = VerifyingKey::from_sec1_bytes(&point).unwrap();
        assert!(verifying
            .verify(signing_input.as_bytes(), &signature)
            .is_ok());
    }
}
