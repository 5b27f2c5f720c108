//! Filesystem copy collaborator.

use std::path::Path;

use filetime::FileTime;
use tokio::fs;

/// Copy `src` to `dst`, creating intermediate directories for `dst` if
/// absent and carrying the source's modification time over to the copy.
/// An existing destination file is overwritten.
pub async fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    let metadata = fs::metadata(src).await?;
    fs::copy(src, dst).await?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    let dst = dst.to_path_buf();
    tokio::task::spawn_blocking(move || filetime::set_file_mtime(&dst, mtime))
        .await
        .map_err(std::io::Error::other)??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_creates_parents_and_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.dat");
        let dst = temp.path().join("nested/dir/dst.dat");

        fs::write(&src, b"payload").await.unwrap();
        let past = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, past).unwrap();

        copy_file(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"payload");
        let copied = std::fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), past);
    }

    #[tokio::test]
    async fn test_copy_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.dat");
        let dst = temp.path().join("dst.dat");

        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        copy_file(&src, &dst).await.unwrap();
        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(&temp.path().join("gone.dat"), &temp.path().join("d.dat")).await;
        assert!(result.is_err());
    }
}
