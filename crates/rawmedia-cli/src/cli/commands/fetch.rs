//! `rawmedia fetch` – download and require the announced length.

use anyhow::Result;
use rawmedia_core::config::RawMediaConfig;
use rawmedia_core::length::LengthPolicy;
use rawmedia_core::pipeline::{self, PipelineOptions};

use crate::cli::JobArgs;

pub fn run_fetch(cfg: &RawMediaConfig, args: &JobArgs, detect: bool) -> Result<()> {
    let job = args.resolve()?;
    let opts = PipelineOptions {
        length_policy: LengthPolicy::Strict,
        detect_type: detect,
        headers: args.header_map(),
        output_dir: std::env::current_dir()?,
    };
    tracing::info!(url = %job.url, expected = job.expected_length, "fetch");
    let report = pipeline::run(&job, cfg, &opts)?;
    print!("{}", report);
    Ok(())
}
