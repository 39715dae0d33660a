//! Detached HMAC-SHA256 check over a downloaded media blob.
//!
//! Layout: the first [`MAC_TAG_LEN`] bytes are the tag, the rest is the
//! authenticated payload. Nothing is decrypted here.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::MediaError;

type HmacSha256 = Hmac<Sha256>;

/// Size of the detached tag at the start of the blob.
pub const MAC_TAG_LEN: usize = 32;

/// Outcome of a MAC check. A blob too short to carry a tag is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacOutcome {
    Match,
    Mismatch,
    NotVerifiable,
}

impl MacOutcome {
    /// `Some(true|false)` when a comparison took place.
    pub fn matched(self) -> Option<bool> {
        match self {
            MacOutcome::Match => Some(true),
            MacOutcome::Mismatch => Some(false),
            MacOutcome::NotVerifiable => None,
        }
    }
}

impl fmt::Display for MacOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacOutcome::Match => write!(f, "true"),
            MacOutcome::Mismatch => write!(f, "false"),
            MacOutcome::NotVerifiable => write!(f, "not verifiable (file too short)"),
        }
    }
}

/// Tag/payload view over a blob longer than [`MAC_TAG_LEN`].
#[derive(Debug, Clone, Copy)]
pub struct MacEnvelope<'a> {
    tag: &'a [u8],
    payload: &'a [u8],
}

impl<'a> MacEnvelope<'a> {
    /// Returns `None` when `blob.len() <= MAC_TAG_LEN`.
    pub fn split(blob: &'a [u8]) -> Option<Self> {
        if blob.len() <= MAC_TAG_LEN {
            return None;
        }
        let (tag, payload) = blob.split_at(MAC_TAG_LEN);
        Some(Self { tag, payload })
    }

    pub fn tag(&self) -> &'a [u8] {
        self.tag
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Recompute HMAC-SHA256(key, payload) and compare with the tag in constant time.
    pub fn verify(&self, key: &[u8]) -> bool {
        // HMAC takes keys of any length; the error arm is unreachable in practice.
        let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
            return false;
        };
        mac.update(self.payload);
        mac.verify_slice(self.tag).is_ok()
    }
}

/// Check the detached tag of `blob` against `key`.
pub fn verify_mac(blob: &[u8], key: &[u8]) -> MacOutcome {
    match MacEnvelope::split(blob) {
        None => MacOutcome::NotVerifiable,
        Some(env) if env.verify(key) => MacOutcome::Match,
        Some(_) => MacOutcome::Mismatch,
    }
}

/// Decode a base64 media key as carried in webhook payloads (`mediaKey`).
pub fn decode_media_key(b64: &str) -> Result<Vec<u8>, MediaError> {
    STANDARD
        .decode(b64.trim())
        .map_err(MediaError::InvalidMediaKey)
}
