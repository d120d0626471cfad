//! Output filesystem helpers.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

/// Write a rendered file through a scoped, buffered handle.
///
/// The handle is flushed explicitly before it drops so a failed write
/// surfaces as an error instead of a silently truncated output file.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;

    Ok(())
}

/// Remove every existing entry of the output directory.
pub fn clean_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to clear output directory: {}", path.display()))?;
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory: {}", path.display()))?;
    Ok(())
}
