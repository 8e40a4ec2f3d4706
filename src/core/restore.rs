use crate::utils::error::Result;
use crate::utils::validation::require_dir;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A full copy of a directory kept in a temporary location.
///
/// Building a benchmark more than once requires `$SRC` and `$WORK` to look
/// exactly like they did before the first build.
#[derive(Debug)]
pub struct DirectorySnapshot {
    directory: PathBuf,
    backup: PathBuf,
    _temp_dir: TempDir,
}

impl DirectorySnapshot {
    pub fn take(directory: &Path) -> Result<Self> {
        require_dir(directory)?;

        let temp_dir = TempDir::new()?;
        let name = directory
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "backup".into());
        let backup = temp_dir.path().join(name);
        copy_dir_recursive(directory, &backup)?;

        tracing::debug!(
            "Saved {} to {}",
            directory.display(),
            backup.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            backup,
            _temp_dir: temp_dir,
        })
    }

    /// 刪除目前目錄並從備份還原
    pub fn restore(self) -> Result<()> {
        if self.directory.exists() {
            fs::remove_dir_all(&self.directory)?;
        }
        copy_dir_recursive(&self.backup, &self.directory)?;
        tracing::debug!("Restored {}", self.directory.display());
        Ok(())
    }
}

/// Runs `f` with every directory in `directories` restored afterwards.
///
/// Restoration happens in reverse order and only when `f` succeeds; a
/// failing `f` aborts immediately.
pub async fn with_restored<F, Fut, T>(directories: &[&Path], f: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut snapshots = Vec::with_capacity(directories.len());
    for directory in directories {
        snapshots.push(DirectorySnapshot::take(directory)?);
    }

    let value = f().await?;

    while let Some(snapshot) = snapshots.pop() {
        snapshot.restore()?;
    }

    Ok(value)
}

fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source = entry.path();
        let dest = to.join(entry.file_name());

        // 符號連結以其目標內容複製
        if fs::metadata(&source)?.is_dir() {
            copy_dir_recursive(&source, &dest)?;
        } else {
            fs::copy(&source, &dest)?;
        }
    }
    Ok(())
}
