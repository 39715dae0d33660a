//! SHA-256 digests for audit output and the webhook's `fileEncSha256`.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::MediaError;

const BUF_SIZE: usize = 64 * 1024;

/// SHA-256 of an in-memory blob as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compare the blob's SHA-256 with a base64 digest (`fileEncSha256`).
pub fn verify_enc_sha256(data: &[u8], expected_b64: &str) -> Result<bool, MediaError> {
    let expected = STANDARD.decode(expected_b64.trim()).map_err(|e| {
        MediaError::WebhookPayload(format!("fileEncSha256 is not valid base64: {}", e))
    })?;
    Ok(Sha256::digest(data).as_slice() == expected.as_slice())
}
