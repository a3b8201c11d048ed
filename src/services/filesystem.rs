// Real filesystem implementation for production use
//
// Thin wrapper around tokio::fs; test code uses MockFileSystem instead.

use super::traits::FileSystem;
use crate::error::{Result, SmartPlanError};
use async_trait::async_trait;
use std::path::Path;

/// Real filesystem implementation using tokio::fs
pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(SmartPlanError::IoError)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(SmartPlanError::IoError)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(SmartPlanError::IoError)
    }

    async fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(SmartPlanError::IoError)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(SmartPlanError::IoError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_real_filesystem_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        let fs = RealFileSystem;
        fs.write(&test_file, "Hello, world!")
            .await
            .expect("Failed to write file");

        let content = fs
            .read_to_string(&test_file)
            .await
            .expect("Failed to read file");
        assert_eq!(content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_real_filesystem_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("clip.mp4");

        let fs = RealFileSystem;
        fs.write_bytes(&test_file, &[0, 1, 2, 255]).await.unwrap();

        assert_eq!(fs.read(&test_file).await.unwrap(), vec![0, 1, 2, 255]);
    }

    #[tokio::test]
    async fn test_real_filesystem_exists() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        let fs = RealFileSystem;
        assert!(!fs.exists(&test_file).await);

        fs.write(&test_file, "test").await.unwrap();
        assert!(fs.exists(&test_file).await);
    }

    #[tokio::test]
    async fn test_real_filesystem_create_dir_all() {
        let temp_dir = TempDir::new().unwrap();
        let nested_dir = temp_dir.path().join("a").join("b").join("c");

        let fs = RealFileSystem;
        fs.create_dir_all(&nested_dir)
            .await
            .expect("Failed to create directories");

        assert!(fs.exists(&nested_dir).await);
    }

    #[tokio::test]
    async fn test_real_filesystem_read_nonexistent_file() {
        let fs = RealFileSystem;
        let result = fs.read_to_string(Path::new("/nonexistent/file.txt")).await;

        match result {
            Err(SmartPlanError::IoError(_)) => {}
            _ => panic!("Expected IoError"),
        }
    }
}
