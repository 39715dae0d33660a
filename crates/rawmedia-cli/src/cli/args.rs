//! Job arguments shared by `fetch` and `inspect`.

use anyhow::{bail, Result};
use clap::Args;
use rawmedia_core::config::{self, MediaJob};
use rawmedia_core::webhook;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where the job comes from: flags, a job TOML file, or a webhook JSON payload.
/// Flags override values read from files.
#[derive(Debug, Clone, Default, Args)]
pub struct JobArgs {
    /// URL returned by the webhook.
    #[arg(long)]
    pub url: Option<String>,

    /// fileLength announced by the webhook.
    #[arg(long, value_name = "BYTES")]
    pub length: Option<u64>,

    /// Base64 media key; enables the MAC check.
    #[arg(long, value_name = "BASE64")]
    pub media_key: Option<String>,

    /// Destination file (default: derived from the detected type).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read the job from a TOML file.
    #[arg(long, value_name = "FILE", conflicts_with = "webhook")]
    pub job: Option<PathBuf>,

    /// Read the job from a webhook JSON payload.
    #[arg(long, value_name = "FILE")]
    pub webhook: Option<PathBuf>,

    /// Extra request header, e.g. `--header "Origin: https://web.whatsapp.com"`.
    #[arg(long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl JobArgs {
    /// Build the job: file (if any) first, then flag overrides.
    pub fn resolve(&self) -> Result<MediaJob> {
        let base = if let Some(path) = &self.job {
            Some(config::load_job(path)?)
        } else if let Some(path) = &self.webhook {
            Some(webhook::job_from_webhook_file(path, None)?)
        } else {
            None
        };

        let mut job = base.unwrap_or_default();
        let from_file = self.job.is_some() || self.webhook.is_some();

        if let Some(url) = &self.url {
            job.url = url.clone();
        }
        match self.length {
            Some(len) => job.expected_length = len,
            None if !from_file => bail!("--length is required without --job or --webhook"),
            None => {}
        }
        if let Some(key) = &self.media_key {
            job.media_key_base64 = Some(key.clone());
        }
        if let Some(output) = &self.output {
            job.output_path = Some(output.clone());
        }
        if job.url.trim().is_empty() {
            bail!("no URL given (use --url, --job or --webhook)");
        }
        Ok(job)
    }

    pub fn header_map(&self) -> BTreeMap<String, String> {
        self.headers.iter().cloned().collect()
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{}`", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}
