//! Checksum command: compute the Adler-32 of a local file.

use anyhow::Result;
use dsync_core::checksum;
use std::path::Path;

/// Compute and print the Adler-32 of the given file, as dCache would report it.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::adler32_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
