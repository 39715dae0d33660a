use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP settings loaded from `~/.config/rawmedia/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMediaConfig {
    /// Read timeout in seconds: the transfer fails once no byte has arrived
    /// for this long. A slow but steady download is never cut off by it.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Upper bound on the whole transfer in seconds; a safety net only.
    #[serde(default = "default_max_transfer_secs")]
    pub max_transfer_secs: u64,
    /// `User-Agent` sent with every GET.
    pub user_agent: String,
    /// Maximum redirects followed before giving up.
    pub max_redirects: u32,
    /// Extra request headers. `Accept-Encoding` is always forced to `identity`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for RawMediaConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 30,
            max_transfer_secs: default_max_transfer_secs(),
            user_agent: default_user_agent(),
            max_redirects: 10,
            headers: BTreeMap::new(),
        }
    }
}

impl RawMediaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn max_transfer(&self) -> Duration {
        Duration::from_secs(self.max_transfer_secs)
    }
}

fn default_max_transfer_secs() -> u64 {
    3600
}

pub fn default_user_agent() -> String {
    format!("rawmedia/{}", env!("CARGO_PKG_VERSION"))
}

/// One media object to fetch, as announced by a webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaJob {
    pub url: String,
    #[serde(alias = "expectedLength")]
    pub expected_length: u64,
    /// Base64 media key; MAC verification is skipped when absent.
    #[serde(default, alias = "mediaKeyBase64")]
    pub media_key_base64: Option<String>,
    /// Destination file; derived from the detected type when absent.
    #[serde(default, alias = "outputPath")]
    pub output_path: Option<PathBuf>,
    /// Base64 SHA-256 of the encrypted blob (`fileEncSha256` in webhook payloads).
    #[serde(default, alias = "fileEncSha256")]
    pub file_enc_sha256: Option<String>,
}

/// Load a job description from a TOML file.
pub fn load_job(path: &Path) -> Result<MediaJob> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read job file {}", path.display()))?;
    let job: MediaJob =
        toml::from_str(&data).with_context(|| format!("parse job file {}", path.display()))?;
    Ok(job)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rawmedia")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RawMediaConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<RawMediaConfig> {
    if !path.exists() {
        let default_cfg = RawMediaConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: RawMediaConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
