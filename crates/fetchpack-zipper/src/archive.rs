//! Single-entry zip packaging

use crate::error::{Result, ZipperError};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package the file at `src` as the sole entry of a zip archive written to
/// `dest`, returning the archive size in bytes. The blocking zip writer
/// runs on the blocking thread pool.
pub async fn zip_single_entry(src: &Path, dest: &Path, entry_name: &str) -> Result<u64> {
    let src_owned = src.to_path_buf();
    let dest_owned = dest.to_path_buf();
    let entry = entry_name.to_string();

    let size =
        tokio::task::spawn_blocking(move || write_archive(&src_owned, &dest_owned, &entry))
            .await
            .map_err(|e| ZipperError::Io(Box::new(io::Error::other(e))))??;

    debug!(dest = ?dest, entry_name = %entry_name, size, "Wrote zip archive");
    Ok(size)
}

fn write_archive(src: &Path, dest: &Path, entry_name: &str) -> Result<u64> {
    let mut reader = File::open(src)?;
    let mut archive = ZipWriter::new(File::create(dest)?);

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    archive.start_file(entry_name, options)?;
    io::copy(&mut reader, &mut archive)?;

    let file = archive.finish()?;
    Ok(file.metadata()?.len())
}
