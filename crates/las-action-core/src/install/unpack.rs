use crate::error::{ActionError, Result};
use flate2::read::GzDecoder;
use std::path::{Path, PathBuf};

/// Extract a `.tar.gz` archive into `destination`, creating it if needed.
///
/// Runs on the blocking pool; entry modes from the archive are preserved.
pub async fn extract_tar_gz(archive: Vec<u8>, destination: PathBuf) -> Result<()> {
    let target = destination.clone();
    tokio::task::spawn_blocking(move || unpack(&archive, &target))
        .await
        .map_err(|join_err| ActionError::Extract {
            destination: destination.clone(),
            source: std::io::Error::other(join_err),
        })?
        .map_err(|source| ActionError::Extract {
            destination,
            source,
        })
}

fn unpack(archive: &[u8], destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(destination)?;
    let mut tar = tar::Archive::new(GzDecoder::new(archive));
    tar.set_preserve_permissions(true);
    tar.unpack(destination)
}
