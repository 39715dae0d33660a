//! Error taxonomy for fetching and validating media blobs.
//!
//! Only failures that abort a run live here. A MAC mismatch is reported as a
//! [`crate::mac::MacOutcome`] and an unknown file type falls back to `"bin"`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Network failure (timeout, reset, DNS) or a non-2xx response.
    #[error("GET {url} failed: {}", transport_detail(.status, .source))]
    Transport {
        url: String,
        /// HTTP status, when the server answered at all.
        status: Option<u32>,
        source: Option<curl::Error>,
    },

    /// Received byte count differs from the length announced by the webhook.
    #[error("length mismatch: received {actual} bytes, expected {expected}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("media key is not valid base64: {0}")]
    InvalidMediaKey(#[source] base64::DecodeError),

    #[error("webhook payload: {0}")]
    WebhookPayload(String),

    #[error("storage {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MediaError {
    /// HTTP status carried by a transport failure, if any.
    pub fn status(&self) -> Option<u32> {
        match self {
            MediaError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn storage(path: &std::path::Path, source: std::io::Error) -> Self {
        MediaError::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn transport_detail(status: &Option<u32>, source: &Option<curl::Error>) -> String {
    match (status, source) {
        (Some(code), _) => format!("HTTP {}", code),
        (None, Some(e)) => e.to_string(),
        (None, None) => "no response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_message_names_both_sides() {
        let e = MediaError::LengthMismatch {
            expected: 120,
            actual: 100,
        };
        assert_eq!(
            e.to_string(),
            "length mismatch: received 100 bytes, expected 120"
        );
        assert_eq!(e.status(), None);
    }

    #[test]
    fn transport_carries_status() {
        let e = MediaError::Transport {
            url: "https://mmg.example.net/x".to_string(),
            status: Some(404),
            source: None,
        };
        assert_eq!(e.status(), Some(404));
        assert_eq!(e.to_string(), "GET https://mmg.example.net/x failed: HTTP 404");
    }

    #[test]
    fn transport_without_response() {
        let e = MediaError::Transport {
            url: "https://mmg.example.net/x".to_string(),
            status: None,
            source: None,
        };
        assert_eq!(e.status(), None);
        assert!(e.to_string().ends_with("no response"));
    }
}
