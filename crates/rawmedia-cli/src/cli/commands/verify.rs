//! `rawmedia verify <path>` – offline checks on a downloaded blob.

use anyhow::Result;
use rawmedia_core::pipeline;
use std::path::Path;

pub fn run_verify(path: &Path, media_key: Option<&str>) -> Result<()> {
    let report = pipeline::inspect_file(path, media_key)?;
    print!("{}", report);
    Ok(())
}
