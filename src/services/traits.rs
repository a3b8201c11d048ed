// Core trait definitions for service layer dependency injection
//
// All traits are Send + Sync so they can be shared with tasks spawned on the
// tokio runtime (video downloads write through FileSystem from a task).

use crate::agenda::CatchUpPolicy;
use crate::error::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filesystem abstraction for file I/O operations
///
/// Usage:
///     let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
///     let content = fs.read_to_string(Path::new("storage.json")).await?;
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read entire file contents as a UTF-8 string
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Read entire file contents as bytes
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write string content to a file (creates or overwrites)
    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Write raw bytes to a file (creates or overwrites)
    async fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Check if a path exists (file or directory)
    ///
    /// Returns false on permission errors (cannot distinguish from non-existence)
    async fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories (like mkdir -p)
    async fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Flat key/value string store
///
/// The dashboard's only persistence model: every value is a string, usually
/// JSON. Missing keys read as `None`; callers decide the default.
///
/// Usage:
///     storage.set_item("smart_plan_active_view", "agenda").await?;
///     let view = storage.get_item("smart_plan_active_view").await?;
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a single value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Write several values with a single flush
    async fn set_items(&self, entries: &[(String, String)]) -> Result<()>;

    /// Delete a key; removing a missing key is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Configuration service for application settings
///
/// Loaded once at startup from the environment and cached.
#[cfg_attr(test, automock)]
pub trait ConfigService: Send + Sync {
    /// API key for the generative AI service
    ///
    /// # Errors
    /// - No key configured
    fn get_api_key(&self) -> Result<String>;

    /// Directory holding storage.json and downloaded videos
    fn get_data_dir(&self) -> PathBuf;

    fn get_image_model(&self) -> String;

    fn get_video_model(&self) -> String;

    fn get_search_model(&self) -> String;

    /// Period between alarm checks
    fn get_alarm_interval(&self) -> Duration;

    /// Handling of alarms missed while the app was closed
    fn get_catch_up_policy(&self) -> CatchUpPolicy;
}

/// Desktop notification sink
///
/// `notify` returns an error when the platform notifier is unavailable, so
/// the caller can fall back to an in-app dialog.
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// User's answer to the notification permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPermission::Default => "default",
            NotificationPermission::Granted => "granted",
            NotificationPermission::Denied => "denied",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "granted" => NotificationPermission::Granted,
            "denied" => NotificationPermission::Denied,
            _ => NotificationPermission::Default,
        }
    }
}
