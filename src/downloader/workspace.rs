// Per-request scratch directory
//
// Removal happens exactly once: on `release()` or, failing that, on drop.
// Removal errors are logged and swallowed.
// `release()` removes on the blocking pool. Drop cannot await, so it removes
// inline on whatever thread drops the workspace (usually a response body
// finishing on a runtime worker).

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "tube-grab-";

#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `root` (system temp dir when `None`).
    pub fn acquire(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        tracing::debug!(workspace = %path.display(), "workspace allocated");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now, off the async worker threads.
    pub async fn release(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(result) => log_removal(&self.path, result),
            Err(e) => tracing::warn!(
                workspace = %self.path.display(),
                error = %e,
                "workspace cleanup task failed"
            ),
        }
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            log_removal(&self.path, dir.close());
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => tracing::debug!(workspace = %path.display(), "workspace removed"),
        Err(e) => tracing::warn!(
            workspace = %path.display(),
            error = %e,
            "workspace cleanup failed"
        ),
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_removes_directory_and_contents() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::acquire(Some(root.path())).unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested").join("clip.mp4"), b"bytes").unwrap();
        assert!(path.is_dir());

        workspace.release().await;
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let workspace = Workspace::acquire(Some(root.path())).unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::acquire(Some(root.path())).unwrap();
        let b = Workspace::acquire(Some(root.path())).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKSPACE_PREFIX));
    }

    #[tokio::test]
    async fn test_already_removed_directory_does_not_panic() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::acquire(Some(root.path())).unwrap();
        std::fs::remove_dir_all(workspace.path()).unwrap();
        workspace.release().await;

        let dropped = Workspace::acquire(Some(root.path())).unwrap();
        std::fs::remove_dir_all(dropped.path()).unwrap();
        drop(dropped);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        assert!(Workspace::acquire(Some(&missing)).is_err());
    }
}
