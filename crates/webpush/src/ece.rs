//! aes128gcm content encoding for Web Push payloads (RFC 8291 / RFC 8188).
//!
//! Messages are always a single record: ECDH over P-256 against the
//! subscriber key, HKDF-SHA256 key schedule, AES-128-GCM seal. The encoded
//! message carries its own salt and the sender's ephemeral public key.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use p256::SecretKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::WebPushError;
use crate::keys::{ReceiverKeys, SubscriberKeys, UNCOMPRESSED_POINT_LEN};

/// Record size written into the message header. Single-record messages
/// never exceed it.
pub const RECORD_SIZE: u32 = 4096;

/// GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Last-record padding delimiter.
const PAD_DELIMITER: u8 = 0x02;

const KEY_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

/// Header length: salt(16) + rs(4) + idlen(1) + keyid(65).
const HEADER_LEN: usize = 16 + 4 + 1 + UNCOMPRESSED_POINT_LEN;

/// Encrypt a payload to a subscriber with a fresh ephemeral key and salt.
pub fn encrypt(keys: &SubscriberKeys, plaintext: &[u8]) -> Result<Vec<u8>, WebPushError> {
    let ephemeral = SecretKey::random(&mut OsRng);
    let salt: [u8; 16] = rand::random();
    encrypt_with(keys, plaintext, &ephemeral, &salt)
}

fn encrypt_with(
    keys: &SubscriberKeys,
    plaintext: &[u8],
    ephemeral: &SecretKey,
    salt: &[u8; 16],
) -> Result<Vec<u8>, WebPushError> {
    // delimiter + tag must still fit in the record
    if plaintext.len() + 1 + TAG_LEN > RECORD_SIZE as usize {
        return Err(WebPushError::Encryption(format!(
            "payload too large for a single record ({} bytes)",
            plaintext.len()
        )));
    }

    let shared =
        p256::ecdh::diffie_hellman(ephemeral.to_nonzero_scalar(), keys.public_key.as_affine());
    let ephemeral_point = ephemeral
        .public_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();

    let (cek, nonce) = derive_schedule(
        shared.raw_secret_bytes().as_slice(),
        &keys.auth,
        &keys.public_point(),
        &ephemeral_point,
        salt,
    )?;

    let mut record = Vec::with_capacity(plaintext.len() + 1);
    record.extend_from_slice(plaintext);
    record.push(PAD_DELIMITER);

    let cipher = Aes128Gcm::new_from_slice(&cek)
        .map_err(|_| WebPushError::Encryption("bad CEK length".into()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), record.as_slice())
        .map_err(|_| WebPushError::Encryption("AEAD seal failed".into()))?;

    let mut message = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    message.extend_from_slice(salt);
    message.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    message.push(UNCOMPRESSED_POINT_LEN as u8);
    message.extend_from_slice(&ephemeral_point);
    message.extend_from_slice(&ciphertext);
    Ok(message)
}

/// Decrypt an aes128gcm message with the receiver's subscription keys.
pub fn decrypt(receiver: &ReceiverKeys, message: &[u8]) -> Result<Vec<u8>, WebPushError> {
    if message.len() < HEADER_LEN + TAG_LEN {
        return Err(WebPushError::Decryption("message too short".into()));
    }

    let salt: [u8; 16] = message[..16].try_into().unwrap();
    let idlen = message[20] as usize;
    if idlen != UNCOMPRESSED_POINT_LEN {
        return Err(WebPushError::Decryption(format!(
            "unexpected keyid length {idlen}"
        )));
    }
    let sender_point = &message[21..21 + idlen];
    let ciphertext = &message[HEADER_LEN..];

    let sender_key = p256::PublicKey::from_sec1_bytes(sender_point)
        .map_err(|_| WebPushError::Decryption("keyid is not a valid P-256 point".into()))?;
    let shared =
        p256::ecdh::diffie_hellman(receiver.secret().to_nonzero_scalar(), sender_key.as_affine());

    let (cek, nonce) = derive_schedule(
        shared.raw_secret_bytes().as_slice(),
        receiver.auth(),
        &receiver.public_point(),
        sender_point,
        &salt,
    )?;

    let cipher = Aes128Gcm::new_from_slice(&cek)
        .map_err(|_| WebPushError::Decryption("bad CEK length".into()))?;
    let mut record = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|_| WebPushError::Decryption("AEAD open failed".into()))?;

    // Strip padding: zero fill, then the delimiter octet.
    while record.last() == Some(&0) {
        record.pop();
    }
    if record.pop() != Some(PAD_DELIMITER) {
        return Err(WebPushError::Decryption("missing record delimiter".into()));
    }
    Ok(record)
}

/// HKDF-SHA256 key schedule shared by both directions.
///
/// IKM is derived from the ECDH secret bound to both public keys, then the
/// message salt expands it into the content key and nonce.
fn derive_schedule(
    ecdh_secret: &[u8],
    auth: &[u8; 16],
    receiver_point: &[u8],
    sender_point: &[u8],
    salt: &[u8; 16],
) -> Result<([u8; 16], [u8; 12]), WebPushError> {
    let mut key_info = Vec::with_capacity(KEY_INFO_PREFIX.len() + 2 * UNCOMPRESSED_POINT_LEN);
    key_info.extend_from_slice(KEY_INFO_PREFIX);
    key_info.extend_from_slice(receiver_point);
    key_info.extend_from_slice(sender_point);

    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth), ecdh_secret)
        .expand(&key_info, &mut ikm)
        .map_err(|_| WebPushError::Encryption("HKDF ikm expansion failed".into()))?;

    let prk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; 16];
    prk.expand(CEK_INFO, &mut cek)
        .map_err(|_| WebPushError::Encryption("HKDF cek expansion failed".into()))?;
    let mut nonce = [0u8; 12];
    prk.expand(NONCE_INFO, &mut nonce)
        .map_err(|_| WebPushError::Encryption("HKDF nonce expansion failed".into()))?;

    Ok((cek, nonce))
}
