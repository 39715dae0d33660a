//! Fetch → length audit → type detection → MAC check → persist.
//!
//! Every step runs at most once; any error aborts the run before the output
//! file is written.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::checksum;
use crate::config::{MediaJob, RawMediaConfig};
use crate::error::MediaError;
use crate::fetch;
use crate::length::{self, LengthPolicy};
use crate::mac::{self, MacOutcome};
use crate::signature;
use crate::storage;

/// Output name used when nothing was detected or detection is off.
pub const DEFAULT_OUTPUT_NAME: &str = "raw_media.bin";

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub length_policy: LengthPolicy,
    /// Guess the file type from magic bytes (also picks the output extension).
    pub detect_type: bool,
    /// Extra request headers for this run.
    pub headers: BTreeMap<String, String>,
    /// Directory for auto-derived output names.
    pub output_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            length_policy: LengthPolicy::Strict,
            detect_type: false,
            headers: BTreeMap::new(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// What a run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReport {
    pub received_length: u64,
    pub expected_length: u64,
    pub extension: Option<&'static str>,
    pub output_path: PathBuf,
    pub sha256: String,
    /// `None` when no media key was supplied.
    pub mac: Option<MacOutcome>,
    /// `None` when the job carries no `fileEncSha256`.
    pub enc_sha256_match: Option<bool>,
}

impl MediaReport {
    pub fn delta(&self) -> i128 {
        length::length_delta(self.received_length, self.expected_length)
    }
}

impl fmt::Display for MediaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Received length: {} bytes (expected {})",
            self.received_length, self.expected_length
        )?;
        writeln!(f, "Delta: {} bytes", self.delta())?;
        if let Some(ext) = self.extension {
            writeln!(f, "Detected extension: .{}", ext)?;
        }
        writeln!(
            f,
            "Saved file as: {} ({} bytes)",
            self.output_path.display(),
            self.received_length
        )?;
        writeln!(f, "SHA256: {}", self.sha256)?;
        if let Some(m) = self.enc_sha256_match {
            writeln!(f, "fileEncSha256 match: {}", m)?;
        }
        match self.mac {
            Some(MacOutcome::NotVerifiable) => writeln!(f, "File too short for MAC validation.")?,
            Some(outcome) => writeln!(f, "MAC match: {}", outcome)?,
            None => {}
        }
        Ok(())
    }
}

/// `download.<ext>` for a detected type, [`DEFAULT_OUTPUT_NAME`] otherwise.
pub fn default_file_name(extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("download.{}", ext),
        None => DEFAULT_OUTPUT_NAME.to_string(),
    }
}

/// Run the whole pipeline for one job.
pub fn run(
    job: &MediaJob,
    cfg: &RawMediaConfig,
    opts: &PipelineOptions,
) -> Result<MediaReport, MediaError> {
    // Decode before touching the network so a bad key never costs a download.
    let key = job
        .media_key_base64
        .as_deref()
        .map(mac::decode_media_key)
        .transpose()?;

    let blob = fetch::fetch(&job.url, &opts.headers, cfg)?;
    let received = blob.len();
    tracing::info!(
        status = blob.status,
        received,
        expected = job.expected_length,
        "media blob received"
    );

    match opts.length_policy {
        LengthPolicy::Strict => length::validate_length(received, job.expected_length)?,
        LengthPolicy::Report => {
            if received != job.expected_length {
                tracing::warn!(
                    received,
                    expected = job.expected_length,
                    "received length differs from expected"
                );
            }
        }
    }

    let extension = opts
        .detect_type
        .then(|| signature::detect_extension(blob.as_bytes()));
    if let Some(ext) = extension {
        tracing::debug!(ext, "detected extension");
    }

    let mac = key.as_deref().map(|k| mac::verify_mac(blob.as_bytes(), k));
    if mac == Some(MacOutcome::Mismatch) {
        tracing::warn!(url = %job.url, "MAC mismatch");
    }

    let enc_sha256_match = job
        .file_enc_sha256
        .as_deref()
        .map(|d| checksum::verify_enc_sha256(blob.as_bytes(), d))
        .transpose()?;

    let output_path = job
        .output_path
        .clone()
        .unwrap_or_else(|| opts.output_dir.join(default_file_name(extension)));
    storage::write_blob(&output_path, blob.as_bytes())?;

    Ok(MediaReport {
        received_length: received,
        expected_length: job.expected_length,
        extension,
        output_path,
        sha256: checksum::sha256_hex(blob.as_bytes()),
        mac,
        enc_sha256_match,
    })
}

/// Offline checks against a blob already on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub length: u64,
    pub extension: &'static str,
    pub sha256: String,
    pub mac: Option<MacOutcome>,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {} ({} bytes)", self.path.display(), self.length)?;
        writeln!(f, "Detected extension: .{}", self.extension)?;
        writeln!(f, "SHA256: {}", self.sha256)?;
        match self.mac {
            Some(MacOutcome::NotVerifiable) => writeln!(f, "File too short for MAC validation.")?,
            Some(outcome) => writeln!(f, "MAC match: {}", outcome)?,
            None => {}
        }
        Ok(())
    }
}

/// Detection, digest and MAC check for a file on disk.
pub fn inspect_file(path: &Path, media_key_base64: Option<&str>) -> anyhow::Result<FileReport> {
    let key = media_key_base64.map(mac::decode_media_key).transpose()?;
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(FileReport {
        path: path.to_path_buf(),
        length: data.len() as u64,
        extension: signature::detect_extension(&data),
        sha256: checksum::sha256_hex(&data),
        mac: key.as_deref().map(|k| mac::verify_mac(&data, k)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names() {
        assert_eq!(default_file_name(Some("png")), "download.png");
        assert_eq!(default_file_name(Some("bin")), "download.bin");
        assert_eq!(default_file_name(None), "raw_media.bin");
    }

    #[test]
    fn bad_key_fails_before_network() {
        let job = MediaJob {
            url: "http://127.0.0.1:9/never".to_string(),
            expected_length: 1,
            media_key_base64: Some("***".to_string()),
            ..Default::default()
        };
        let err = run(&job, &RawMediaConfig::default(), &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, MediaError::InvalidMediaKey(_)));
    }

    #[test]
    fn report_display_lines() {
        let report = MediaReport {
            received_length: 100,
            expected_length: 120,
            extension: Some("png"),
            output_path: PathBuf::from("download.png"),
            sha256: "ab".repeat(32),
            mac: Some(MacOutcome::Mismatch),
            enc_sha256_match: None,
        };
        let text = report.to_string();
        assert!(text.contains("Received length: 100 bytes (expected 120)"));
        assert!(text.contains("Delta: -20 bytes"));
        assert!(text.contains("Detected extension: .png"));
        assert!(text.contains("MAC match: false"));
        assert!(!text.contains("fileEncSha256"));
    }

    #[test]
    fn report_display_short_blob() {
        let report = MediaReport {
            received_length: 10,
            expected_length: 10,
            extension: None,
            output_path: PathBuf::from("raw_media.bin"),
            sha256: String::new(),
            mac: Some(MacOutcome::NotVerifiable),
            enc_sha256_match: Some(true),
        };
        let text = report.to_string();
        assert!(text.contains("Delta: 0 bytes"));
        assert!(text.contains("File too short for MAC validation."));
        assert!(text.contains("fileEncSha256 match: true"));
        assert!(!text.contains("Detected extension"));
    }

    #[test]
    fn inspect_file_png_short() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();
        let r = inspect_file(&path, Some("AAAA")).unwrap();
        assert_eq!(r.extension, "png");
        assert_eq!(r.length, 8);
        assert_eq!(r.mac, Some(MacOutcome::NotVerifiable));
    }

    #[test]
    fn inspect_file_without_key_skips_mac() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.enc");
        std::fs::write(&path, [0u8; 64]).unwrap();
        let r = inspect_file(&path, None).unwrap();
        assert_eq!(r.extension, "bin");
        assert!(r.mac.is_none());
        assert_eq!(r.sha256, checksum::sha256_hex(&[0u8; 64]));
    }
}
