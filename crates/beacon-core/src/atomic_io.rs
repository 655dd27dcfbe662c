use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context, Result};
use serde::Serialize;

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn staging_path(destination: &Path) -> Result<(PathBuf, PathBuf)> {
    if destination.as_os_str().is_empty() {
        bail!("output path cannot be empty");
    }
    if destination.is_dir() {
        bail!("output path '{}' is a directory", destination.display());
    }
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = destination
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("beacon-output");
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let staging = directory.join(format!(
        ".{stem}.{}-{sequence}.partial",
        std::process::id()
    ));
    Ok((directory, staging))
}

/// Replaces `path` with `content` via a synced staging file and a rename.
///
/// Readers polling the file (a browser tab, a static file server) see either
/// the previous page or the new one, never a truncated write.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    let (directory, staging) = staging_path(path)?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create output directory {}", directory.display()))?;

    let written = File::create(&staging).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    if let Err(error) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(error)
            .with_context(|| format!("failed to stage {}", staging.display()));
    }
    if let Err(error) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(error).with_context(|| {
            format!("failed to move {} into place at {}", staging.display(), path.display())
        });
    }
    Ok(())
}

/// Pretty-printed JSON with a trailing newline, written atomically.
pub fn write_json_pretty_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut payload =
        serde_json::to_string_pretty(value).context("failed to serialize json payload")?;
    payload.push('\n');
    write_text_atomic(path, &payload)
}
