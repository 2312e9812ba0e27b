//! Filesystem helpers shared by the credential and document stores.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;

/// Suffix of in-flight staging files. Listing code skips these.
pub(crate) const STAGING_SUFFIX: &str = ".staging";

/// Write `bytes` to `dest` so readers see either the old or the new
/// content, never a partial file.
///
/// The data is written to a hidden staging file next to `dest`, flushed to
/// disk, then renamed over the target.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let nonce: u64 = rand::thread_rng().gen();
    let staging_path = parent.join(format!(".{}.{:016x}{}", file_name, nonce, STAGING_SUFFIX));

    let written = (|| -> io::Result<()> {
        let mut file = File::create(&staging_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&staging_path, dest)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&staging_path);
    }
    written
}
