//! Single streaming HTTP GET for a media blob.
//!
//! Uses the curl crate (libcurl). The body is accumulated in memory in the
//! order chunks arrive. `Accept-Encoding: identity` is always sent so that no
//! transparent decompression can change the bytes the length and MAC checks
//! run against.

use std::collections::BTreeMap;

use crate::config::RawMediaConfig;
use crate::error::MediaError;

/// Bytes received from a successful GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    /// Final HTTP status (2xx).
    pub status: u32,
}

impl MediaBlob {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Header lines for the GET: configured headers, then caller headers, with any
/// `Accept-Encoding` replaced by `identity`.
pub fn request_headers(
    cfg: &RawMediaConfig,
    custom_headers: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (k, v) in cfg.headers.iter().chain(custom_headers.iter()) {
        let name = k.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("accept-encoding") {
            continue;
        }
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.to_string(), v.trim().to_string());
    }
    let mut lines: Vec<String> = merged
        .into_iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    lines.push("Accept-Encoding: identity".to_string());
    lines
}

/// GET `url` and return the full body.
///
/// Fails with [`MediaError::Transport`] when the connection cannot be made,
/// the body stalls for longer than the read timeout, or the response is not
/// 2xx; no retry is attempted.
pub fn fetch(
    url: &str,
    custom_headers: &BTreeMap<String, String>,
    cfg: &RawMediaConfig,
) -> Result<MediaBlob, MediaError> {
    url::Url::parse(url).map_err(|source| MediaError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let transport = |status: Option<u32>, source: Option<curl::Error>| MediaError::Transport {
        url: url.to_string(),
        status,
        source,
    };
    let setup = |e: curl::Error| transport(None, Some(e));

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(setup)?;
    easy.get(true).map_err(setup)?;
    easy.follow_location(true).map_err(setup)?;
    easy.max_redirections(cfg.max_redirects).map_err(setup)?;
    easy.connect_timeout(cfg.connect_timeout()).map_err(setup)?;
    // Stall detection: abort when under 1 byte/s for the whole read timeout.
    easy.low_speed_limit(1).map_err(setup)?;
    easy.low_speed_time(cfg.timeout()).map_err(setup)?;
    easy.timeout(cfg.max_transfer()).map_err(setup)?;
    easy.useragent(&cfg.user_agent).map_err(setup)?;

    let mut list = curl::easy::List::new();
    for line in request_headers(cfg, custom_headers) {
        list.append(&line).map_err(setup)?;
    }
    easy.http_headers(list).map_err(setup)?;

    tracing::debug!(url, timeout_secs = cfg.timeout_secs, "GET media blob");

    let mut body: Vec<u8> = Vec::new();
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if !data.is_empty() {
                    body.extend_from_slice(data);
                }
                Ok(data.len())
            })
            .map_err(setup)?;
        transfer.perform()
    };

    let status = easy.response_code().ok().filter(|&c| c != 0);
    if let Err(e) = performed {
        tracing::warn!(url, ?status, "GET failed: {}", e);
        return Err(transport(status, Some(e)));
    }

    let code = status.ok_or_else(|| transport(None, None))?;
    if !(200..300).contains(&code) {
        tracing::warn!(url, code, "GET returned non-success status");
        return Err(transport(Some(code), None));
    }

    tracing::info!(url, code, bytes = body.len(), "GET complete");
    Ok(MediaBlob {
        bytes: body,
        status: code,
    })
}
