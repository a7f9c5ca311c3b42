use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::debug;
use uuid::Uuid;

/// Directory of publicly served cover images. Entries are referenced by bare
/// file name only.
#[derive(Clone, Debug)]
pub struct FileArea {
    root: PathBuf,
}

impl FileArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn store(&self, bytes: &[u8], extension: &str) -> io::Result<String> {
        self.ensure_root().await?;

        let name = format!("{}.{}", Uuid::new_v4(), extension.trim_start_matches('.'));
        tokio::fs::write(self.root.join(&name), bytes).await?;

        debug!(file = %name, size = bytes.len(), "stored image");
        Ok(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Some(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    pub async fn delete(&self, name: &str) -> io::Result<()> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("invalid image name: {name:?}"))
        })?;
        tokio::fs::remove_file(path).await?;

        debug!(file = %name, "deleted image");
        Ok(())
    }

    pub async fn delete_if_exists(&self, name: &str) -> io::Result<bool> {
        if !self.exists(name).await {
            return Ok(false);
        }
        match self.delete(name).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        self.resolve(name)
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0');
        plain.then(|| self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_generates_unique_names_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::new(dir.path().join("images"));

        let a = area.store(b"first", "png").await.unwrap();
        let b = area.store(b"second", ".png").await.unwrap();

        assert_ne!(a, b);
        assert!(a.ends_with(".png") && b.ends_with(".png"));
        assert!(!b.contains(".."));
        let stem = a.trim_end_matches(".png");
        assert!(Uuid::parse_str(stem).is_ok());

        let content = tokio::fs::read(area.path_of(&a).unwrap()).await.unwrap();
        assert_eq!(content, b"first");
    }

    #[tokio::test]
    async fn delete_if_exists_is_quiet_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::new(dir.path());

        let name = area.store(b"bytes", "gif").await.unwrap();
        assert!(area.exists(&name).await);
        assert!(area.delete_if_exists(&name).await.unwrap());
        assert!(!area.exists(&name).await);
        assert!(!area.delete_if_exists(&name).await.unwrap());
        assert!(!area.delete_if_exists("").await.unwrap());
    }

    #[tokio::test]
    async fn names_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let area = FileArea::new(dir.path().join("images"));
        area.ensure_root().await.unwrap();
        tokio::fs::write(dir.path().join("secret.txt"), b"x").await.unwrap();

        assert!(!area.exists("../secret.txt").await);
        assert!(area.delete("../secret.txt").await.is_err());
        assert!(area.path_of("..").is_none());
        assert!(tokio::fs::try_exists(dir.path().join("secret.txt")).await.unwrap());
    }
}
