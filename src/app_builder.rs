// AppBuilder pattern for dependency construction and injection
//
// Production wiring and test wiring go through the same builder; tests swap
// in the mockall mocks and skip the runtime.
//
// Usage Example:
//     // Production
//     let deps = AppBuilder::new()
//         .with_production_deps()?
//         .build()?;
//
//     // Testing
//     let deps = AppBuilder::new()
//         .with_test_deps()
//         .build()?;

use crate::error::{Result, SmartPlanError};
use crate::events::EventBus;
use crate::genai::{AdapterType, GenAiAdapter, ModelSet};
use crate::services::{
    ConfigService, DesktopNotifier, FileConfigService, FileStorageService, FileSystem, Notifier,
    RealFileSystem, StorageService,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for constructing the SmartPlan app with dependency injection
///
/// # Examples
///
/// ```no_run
/// use smartplan::AppBuilder;
///
/// fn main() -> smartplan::Result<()> {
///     let deps = AppBuilder::new()
///         .with_production_deps()?
///         .build()?;
///
///     // Use dependencies...
///     Ok(())
/// }
/// ```
pub struct AppBuilder {
    // Optional overrides
    api_key: Option<String>,
    data_dir: Option<PathBuf>,

    filesystem: Option<Arc<dyn FileSystem>>,
    storage: Option<Arc<dyn StorageService>>,
    config: Option<Arc<dyn ConfigService>>,
    notifier: Option<Arc<dyn Notifier>>,

    // Infrastructure
    runtime: Option<Arc<tokio::runtime::Runtime>>,
    event_bus: Option<Arc<EventBus>>,
    genai: Option<Arc<dyn GenAiAdapter>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            data_dir: None,
            filesystem: None,
            storage: None,
            config: None,
            notifier: None,
            runtime: None,
            event_bus: None,
            genai: None,
        }
    }

    /// Use this API key instead of the one from the environment
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Keep storage and videos here instead of the configured data dir
    pub fn with_data_dir(mut self, path: PathBuf) -> Self {
        self.data_dir = Some(path);
        self
    }

    /// Use production dependencies
    ///
    /// Creates real implementations of all services:
    /// - FileConfigService from the environment
    /// - RealFileSystem + FileStorageService under the data directory
    /// - DesktopNotifier
    /// - Gemini adapter (without a key if none is configured)
    /// - A multi-threaded runtime owned by the dependencies
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The configuration is invalid
    /// - The runtime cannot be created
    pub fn with_production_deps(mut self) -> Result<Self> {
        let mut config = FileConfigService::load()?;
        if let Some(key) = self.api_key.take() {
            config = config.with_api_key(Some(key));
        }
        if let Some(dir) = self.data_dir.take() {
            config = config.with_data_dir(dir);
        }
        let data_dir = config.get_data_dir();
        tracing::info!("Data directory: {:?}", data_dir);

        let filesystem = Arc::new(RealFileSystem) as Arc<dyn FileSystem>;
        let storage = Arc::new(FileStorageService::new(filesystem.clone(), data_dir))
            as Arc<dyn StorageService>;

        let runtime = Arc::new(tokio::runtime::Runtime::new().map_err(|e| {
            SmartPlanError::ConfigError(format!("Failed to create runtime: {}", e))
        })?);
        let event_bus = Arc::new(EventBus::new());

        let api_key = config.get_api_key().ok();
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set - AI features will ask for a key");
        }
        let genai = Arc::from(crate::genai::create_adapter(
            AdapterType::Gemini,
            api_key,
            ModelSet {
                image: config.get_image_model(),
                video: config.get_video_model(),
                search: config.get_search_model(),
            },
        )) as Arc<dyn GenAiAdapter>;

        self.filesystem = Some(filesystem);
        self.storage = Some(storage);
        self.config = Some(Arc::new(config) as Arc<dyn ConfigService>);
        self.notifier = Some(Arc::new(DesktopNotifier::new("SmartPlan")) as Arc<dyn Notifier>);
        self.runtime = Some(runtime);
        self.event_bus = Some(event_bus);
        self.genai = Some(genai);

        Ok(self)
    }

    /// Use test dependencies (mocks)
    ///
    /// No runtime and no AI adapter; inject them when a test needs them.
    #[cfg(test)]
    pub fn with_test_deps(mut self) -> Self {
        use crate::services::mocks::test_helpers::*;

        self.filesystem = Some(Arc::new(create_mock_filesystem()) as Arc<dyn FileSystem>);
        self.storage = Some(Arc::new(create_mock_storage()) as Arc<dyn StorageService>);
        self.config = Some(Arc::new(create_mock_config()) as Arc<dyn ConfigService>);
        self.notifier = Some(Arc::new(create_mock_notifier()) as Arc<dyn Notifier>);
        self.event_bus = Some(Arc::new(EventBus::new()));

        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.filesystem = Some(fs);
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn StorageService>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_config(mut self, config: Arc<dyn ConfigService>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_runtime(mut self, runtime: Arc<tokio::runtime::Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_genai(mut self, genai: Arc<dyn GenAiAdapter>) -> Self {
        self.genai = Some(genai);
        self
    }

    /// Build the configured dependencies
    ///
    /// # Errors
    ///
    /// Returns error if any required dependency is missing.
    pub fn build(self) -> Result<AppDependencies> {
        Ok(AppDependencies {
            filesystem: self.filesystem.ok_or_else(|| {
                SmartPlanError::ConfigError("Filesystem not configured".to_string())
            })?,
            storage: self
                .storage
                .ok_or_else(|| SmartPlanError::ConfigError("Storage not configured".to_string()))?,
            config: self
                .config
                .ok_or_else(|| SmartPlanError::ConfigError("Config not configured".to_string()))?,
            notifier: self
                .notifier
                .ok_or_else(|| SmartPlanError::ConfigError("Notifier not configured".to_string()))?,
            runtime: self.runtime,
            event_bus: self.event_bus.ok_or_else(|| {
                SmartPlanError::ConfigError("Event bus not configured".to_string())
            })?,
            genai: self.genai,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all application dependencies
///
/// # Runtime Ownership
///
/// Production builds own a multi-threaded runtime. Tests may leave it out.
pub struct AppDependencies {
    pub filesystem: Arc<dyn FileSystem>,
    pub storage: Arc<dyn StorageService>,
    pub config: Arc<dyn ConfigService>,
    pub notifier: Arc<dyn Notifier>,
    pub runtime: Option<Arc<tokio::runtime::Runtime>>,
    pub event_bus: Arc<EventBus>,
    pub genai: Option<Arc<dyn GenAiAdapter>>,
}

impl AppDependencies {
    /// Where finished videos are written
    pub fn videos_dir(&self) -> PathBuf {
        self.config.get_data_dir().join("videos")
    }

    /// Where saved images go: the user's downloads folder when there is one
    pub fn downloads_dir(&self) -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| self.config.get_data_dir().join("downloads"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::MockGenAiAdapter;
    use crate::services::mocks::test_helpers::*;

    #[test]
    fn test_builder_with_test_deps() {
        let deps = AppBuilder::new().with_test_deps().build().unwrap();

        assert!(Arc::strong_count(&deps.storage) >= 1);
        assert!(deps.runtime.is_none());
        assert!(deps.genai.is_none());
        assert_eq!(deps.videos_dir(), PathBuf::from("test-data").join("videos"));
    }

    #[test]
    fn test_builder_with_production_deps() {
        let temp_dir = tempfile::tempdir().unwrap();

        let deps = AppBuilder::new()
            .with_api_key("sk-test-key".to_string())
            .with_data_dir(temp_dir.path().to_path_buf())
            .with_production_deps()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(deps.config.get_data_dir(), temp_dir.path());
        assert_eq!(deps.config.get_api_key().unwrap(), "sk-test-key");
        assert!(deps.genai.as_ref().unwrap().has_api_key());
        assert!(deps.runtime.is_some());
    }

    #[test]
    fn test_builder_incomplete_build_fails() {
        match AppBuilder::new().build() {
            Err(SmartPlanError::ConfigError(msg)) => assert!(msg.contains("not configured")),
            _ => panic!("Expected ConfigError for incomplete build"),
        }
    }

    #[test]
    fn test_builder_custom_overrides() {
        let custom_storage = Arc::new(create_mock_storage()) as Arc<dyn StorageService>;
        let genai = Arc::new(MockGenAiAdapter::new()) as Arc<dyn GenAiAdapter>;

        let deps = AppBuilder::new()
            .with_test_deps()
            .with_storage(custom_storage.clone())
            .with_genai(genai.clone())
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(&deps.storage, &custom_storage));
        assert!(Arc::ptr_eq(deps.genai.as_ref().unwrap(), &genai));
    }
}
