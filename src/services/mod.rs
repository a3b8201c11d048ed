// Service layer for dependency injection and testability
//
// Traits define the ports to the outside world (filesystem, key/value
// storage, configuration, desktop notifications). The adapters below connect
// them to real infrastructure; tests swap in the mockall mocks.
//
// Usage Example:
//     // Production code
//     let fs = Arc::new(RealFileSystem);
//     let storage = Arc::new(FileStorageService::new(fs, PathBuf::from("data")));
//     let view = storage.get_item("smart_plan_active_view").await?;
//
//     // Test code
//     let storage = Arc::new(create_mock_storage());

pub mod config;
pub mod filesystem;
#[cfg(test)]
pub mod integration_tests;
#[cfg(test)]
pub mod mocks;
pub mod notifier;
pub mod storage;
pub mod traits;

// Re-export commonly used types
pub use config::FileConfigService;
pub use filesystem::RealFileSystem;
pub use notifier::DesktopNotifier;
pub use storage::FileStorageService;
pub use traits::{ConfigService, FileSystem, NotificationPermission, Notifier, StorageService};
