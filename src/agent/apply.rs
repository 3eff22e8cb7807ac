use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::BACKUP_SUFFIX;
use crate::types::Result;

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Write `content` to `path`, copying any existing file to its backup first.
///
/// Returns the backup location when one was made. No rollback: a failed
/// write after a successful backup leaves both in place.
pub async fn write_with_backup(path: &Path, content: &str) -> Result<Option<PathBuf>> {
    let backup = if tokio::fs::try_exists(path).await? {
        let backup = backup_path(path);
        tokio::fs::copy(path, &backup).await?;
        debug!("Backed up {} to {}", path.display(), backup.display());
        Some(backup)
    } else {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        None
    };

    tokio::fs::write(path, content).await?;
    Ok(backup)
}
