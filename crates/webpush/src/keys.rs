//! Key material handling: base64url codecs, subscription keys, VAPID keys.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use crate::WebPushError;

/// Length of an uncompressed P-256 point in SEC1 encoding.
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// Length of the subscription auth secret.
pub const AUTH_SECRET_LEN: usize = 16;

/// Decode base64url, tolerating both padded and unpadded input.
pub fn b64url_decode(value: &str) -> Result<Vec<u8>, WebPushError> {
    URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| WebPushError::InvalidKey(format!("base64url decode failed: {e}")))
}

/// Encode bytes as unpadded base64url.
pub fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Parsed client-side subscription keys from a push subscription.
#[derive(Debug, Clone)]
pub struct SubscriberKeys {
    /// The subscriber's P-256 ECDH public key (`p256dh`).
    pub public_key: PublicKey,
    /// The 16-byte authentication secret (`auth`).
    pub auth: [u8; AUTH_SECRET_LEN],
}

impl SubscriberKeys {
    /// Parse base64url-encoded `p256dh` and `auth` subscription fields.
    pub fn parse(p256dh: &str, auth: &str) -> Result<Self, WebPushError> {
        let point = b64url_decode(p256dh)?;
        if point.len() != UNCOMPRESSED_POINT_LEN {
            return Err(WebPushError::InvalidKey(format!(
                "p256dh must be a {UNCOMPRESSED_POINT_LEN}-byte uncompressed point, got {}",
                point.len()
            )));
        }
        let public_key = PublicKey::from_sec1_bytes(&point)
            .map_err(|_| WebPushError::InvalidKey("p256dh is not a valid P-256 point".into()))?;

        let auth_bytes = b64url_decode(auth)?;
        let auth: [u8; AUTH_SECRET_LEN] = auth_bytes.as_slice().try_into().map_err(|_| {
            WebPushError::InvalidKey(format!(
                "auth secret must be {AUTH_SECRET_LEN} bytes, got {}",
                auth_bytes.len()
            ))
        })?;

        Ok(Self { public_key, auth })
    }

    /// Uncompressed SEC1 encoding of the subscriber public key.
    pub fn public_point(&self) -> Vec<u8> {
        self.public_key.to_encoded_point(false).as_bytes().to_vec()
    }
}

/// Server-held VAPID signing key pair.
#[derive(Debug, Clone)]
pub struct VapidKeys {
    signing_key: p256::ecdsa::SigningKey,
    public_b64: String,
}

impl VapidKeys {
    /// Load a key pair from base64url-encoded private scalar and public point.
    ///
    /// Verifies that the public key actually belongs to the private key so a
    /// mismatched configuration fails at startup, not at delivery time.
    pub fn from_base64(private: &str, public: &str) -> Result<Self, WebPushError> {
        let scalar = b64url_decode(private)?;
        let secret = SecretKey::from_slice(&scalar)
            .map_err(|_| WebPushError::InvalidKey("VAPID private key is not a valid P-256 scalar".into()))?;
        let signing_key = p256::ecdsa::SigningKey::from(&secret);

        let derived = secret.public_key().to_encoded_point(false);
        let provided = b64url_decode(public)?;
        if derived.as_bytes() != provided.as_slice() {
            return Err(WebPushError::InvalidKey(
                "VAPID public key does not match the private key".into(),
            ));
        }

        Ok(Self {
            signing_key,
            public_b64: b64url_encode(derived.as_bytes()),
        })
    }

    /// Generate a fresh key pair.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public_b64 = b64url_encode(secret.public_key().to_encoded_point(false).as_bytes());
        Self {
            signing_key: p256::ecdsa::SigningKey::from(&secret),
            public_b64,
        }
    }

    /// Base64url private scalar, e.g. for exporting generated keys.
    pub fn private_key_b64(&self) -> String {
        b64url_encode(&self.signing_key.to_bytes())
    }

    /// Base64url uncompressed public point (the client-safe half).
    pub fn public_key_b64(&self) -> &str {
        &self.public_b64
    }

    pub(crate) fn signing_key(&self) -> &p256::ecdsa::SigningKey {
        &self.signing_key
    }
}

/// Receiver-side key material for a push subscription.
///
/// Owned by whoever plays the user-agent role: a fresh ECDH key pair plus
/// auth secret, exported as the subscription's `p256dh`/`auth` fields and
/// used to decrypt delivered messages.
#[derive(Debug, Clone)]
pub struct ReceiverKeys {
    secret: SecretKey,
    auth: [u8; AUTH_SECRET_LEN],
}

impl ReceiverKeys {
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut OsRng),
            auth: rand::random(),
        }
    }

    /// Base64url `p256dh` subscription field.
    pub fn p256dh_b64(&self) -> String {
        b64url_encode(self.secret.public_key().to_encoded_point(false).as_bytes())
    }

    /// Base64url `auth` subscription field.
    pub fn auth_b64(&self) -> String {
        b64url_encode(&self.auth)
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub(crate) fn auth(&self) -> &[u8; AUTH_SECRET_LEN] {
        &self.auth
    }

    /// Uncompressed SEC1 encoding of the receiver public key.
    pub(crate) fn public_point(&self) -> Vec<u8> {
        self.secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}
