//! `rawmedia inspect` – download, report the delta, type, digest and MAC result.

use anyhow::Result;
use rawmedia_core::config::RawMediaConfig;
use rawmedia_core::length::LengthPolicy;
use rawmedia_core::pipeline::{self, PipelineOptions};

use crate::cli::JobArgs;

pub fn run_inspect(cfg: &RawMediaConfig, args: &JobArgs) -> Result<()> {
    let job = args.resolve()?;
    let opts = PipelineOptions {
        length_policy: LengthPolicy::Report,
        detect_type: true,
        headers: args.header_map(),
        output_dir: std::env::current_dir()?,
    };
    println!("Downloading raw file...");
    let report = pipeline::run(&job, cfg, &opts)?;
    print!("{}", report);
    Ok(())
}
