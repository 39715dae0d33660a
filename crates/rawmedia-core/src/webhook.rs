//! Extracting the media fields of a webhook payload into a [`MediaJob`].
//!
//! Payloads carry the media description either at the top level or nested
//! under one of [`WRAPPER_KEYS`]. A delivery body looks like
//! `{"event": .., "sessionId": .., "payload": {"content": {..}, "raw_media": {..}}}`;
//! objects on the same depth are tried in key order, so `raw_media` wins over
//! `content`.
//! `fileLength` arrives as a number, a numeric string, or a protobuf `Long`
//! object (`{"low": .., "high": .., "unsigned": ..}`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::config::MediaJob;
use crate::error::MediaError;

/// Object keys searched, breadth first, for the media description.
pub const WRAPPER_KEYS: &[&str] = &[
    "raw_media",
    "rawMedia",
    "payload",
    "content",
    "media",
    "message",
    "data",
];

const MAX_DEPTH: usize = 4;

/// Media fields found in a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookMedia {
    pub url: String,
    pub file_length: u64,
    pub media_key: Option<String>,
    pub file_enc_sha256: Option<String>,
}

impl WebhookMedia {
    pub fn into_job(self, output_path: Option<PathBuf>) -> MediaJob {
        MediaJob {
            url: self.url,
            expected_length: self.file_length,
            media_key_base64: self.media_key,
            output_path,
            file_enc_sha256: self.file_enc_sha256,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    url: Option<String>,
    file_length: Option<FileLength>,
    file_length_low: Option<u64>,
    media_key: Option<String>,
    file_enc_sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileLength {
    Number(u64),
    Text(String),
    Long { low: i64, high: i64 },
}

impl FileLength {
    fn value(&self) -> Option<u64> {
        match self {
            FileLength::Number(n) => Some(*n),
            FileLength::Text(s) => s.trim().parse().ok(),
            FileLength::Long { low, high } => {
                Some(((*high as u32 as u64) << 32) | (*low as u32 as u64))
            }
        }
    }
}

/// Parse a webhook JSON document and locate its media description.
pub fn parse_webhook(json: &str) -> Result<WebhookMedia, MediaError> {
    let root: Value = serde_json::from_str(json)
        .map_err(|e| MediaError::WebhookPayload(format!("invalid JSON: {}", e)))?;
    let node = find_media_object(&root)
        .ok_or_else(|| MediaError::WebhookPayload("no object with a media `url` found".into()))?;
    let fields: RawFields = serde_json::from_value(node.clone())
        .map_err(|e| MediaError::WebhookPayload(format!("unexpected media fields: {}", e)))?;

    let url = fields
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| MediaError::WebhookPayload("missing `url`".into()))?;
    let file_length = fields
        .file_length
        .as_ref()
        .and_then(FileLength::value)
        .or(fields.file_length_low)
        .ok_or_else(|| MediaError::WebhookPayload("missing or invalid `fileLength`".into()))?;

    Ok(WebhookMedia {
        url,
        file_length,
        media_key: fields.media_key,
        file_enc_sha256: fields.file_enc_sha256,
    })
}

/// Read a webhook payload from disk and turn it into a job.
pub fn job_from_webhook_file(path: &Path, output_path: Option<PathBuf>) -> anyhow::Result<MediaJob> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read webhook payload {}: {}", path.display(), e))?;
    Ok(parse_webhook(&data)?.into_job(output_path))
}

fn is_media_object(v: &Value) -> bool {
    v.get("url").map(Value::is_string).unwrap_or(false)
        && (v.get("fileLength").is_some()
            || v.get("fileLengthLow").is_some()
            || v.get("mediaKey").is_some())
}

fn find_media_object(root: &Value) -> Option<&Value> {
    let mut level: Vec<&Value> = vec![root];
    for _ in 0..MAX_DEPTH {
        if let Some(hit) = level.iter().copied().find(|&v| is_media_object(v)) {
            return Some(hit);
        }
        level = level
            .iter()
            .copied()
            .flat_map(|v| WRAPPER_KEYS.iter().filter_map(move |k| v.get(*k)))
            .filter(|v| v.is_object())
            .collect();
        if level.is_empty() {
            break;
        }
    }
    None
}
