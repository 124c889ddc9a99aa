//! Web Push delivery library.
//!
//! Implements the server side of the Web Push protocol: VAPID request
//! signing (RFC 8292), aes128gcm payload encryption (RFC 8291 / RFC 8188),
//! and HTTP delivery to a subscription endpoint.

pub mod client;
pub mod ece;
pub mod keys;
pub mod vapid;

pub use client::{PushClient, PushReceipt};
pub use keys::{ReceiverKeys, SubscriberKeys, VapidKeys};
pub use vapid::VapidSigner;

/// Unified error type for the webpush crate.
#[derive(Debug, thiserror::Error)]
pub enum WebPushError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("payload encryption failed: {0}")]
    Encryption(String),

    #[error("payload decryption failed: {0}")]
    Decryption(String),

    #[error("subscription endpoint gone (status {0})")]
    EndpointGone(u16),

    #[error("push service rejected the request (status {status}): {message}")]
    Delivery { status: u16, message: String },
}
