// Mock test helpers and common mock patterns
//
// Usage:
//     use crate::services::mocks::test_helpers::*;
//     let mut mock_storage = create_mock_storage();
//     mock_storage.expect_get_item()
//         .returning(|_| Ok(Some("true".to_string())));

#[cfg(test)]
pub mod test_helpers {
    use super::super::traits::*;
    use crate::agenda::CatchUpPolicy;
    use crate::error::SmartPlanError;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Create a mock filesystem where nothing exists yet
    ///
    /// Default behavior:
    /// - exists() returns false
    /// - write() / write_bytes() succeed
    /// - create_dir_all() succeeds
    pub fn create_mock_filesystem() -> MockFileSystem {
        let mut mock = MockFileSystem::new();

        mock.expect_exists().returning(|_| false);
        mock.expect_write().returning(|_, _| Ok(()));
        mock.expect_write_bytes().returning(|_, _| Ok(()));
        mock.expect_create_dir_all().returning(|_| Ok(()));

        mock
    }

    /// Create a mock storage that is empty and accepts every write
    pub fn create_mock_storage() -> MockStorageService {
        let mut mock = MockStorageService::new();

        mock.expect_get_item().returning(|_| Ok(None));
        mock.expect_set_item().returning(|_, _| Ok(()));
        mock.expect_set_items().returning(|_| Ok(()));
        mock.expect_remove_item().returning(|_| Ok(()));

        mock
    }

    /// Create a mock config service with test defaults
    ///
    /// Default behavior:
    /// - get_api_key() returns "test-api-key"
    /// - get_data_dir() returns PathBuf::from("test-data")
    /// - models return "test-*-model"
    /// - alarm interval is 10s with the fire catch-up policy
    pub fn create_mock_config() -> MockConfigService {
        let mut mock = MockConfigService::new();

        mock.expect_get_api_key()
            .returning(|| Ok("test-api-key".to_string()));
        mock.expect_get_data_dir()
            .returning(|| PathBuf::from("test-data"));
        mock.expect_get_image_model()
            .returning(|| "test-image-model".to_string());
        mock.expect_get_video_model()
            .returning(|| "test-video-model".to_string());
        mock.expect_get_search_model()
            .returning(|| "test-search-model".to_string());
        mock.expect_get_alarm_interval()
            .returning(|| Duration::from_secs(10));
        mock.expect_get_catch_up_policy()
            .returning(|| CatchUpPolicy::Fire);

        mock
    }

    /// Same as `create_mock_config` but without an API key
    pub fn create_mock_config_without_key() -> MockConfigService {
        let mut mock = MockConfigService::new();

        mock.expect_get_api_key().returning(|| {
            Err(SmartPlanError::EnvError(
                "GEMINI_API_KEY environment variable not set".to_string(),
            ))
        });
        mock.expect_get_data_dir()
            .returning(|| PathBuf::from("test-data"));
        mock.expect_get_image_model()
            .returning(|| "test-image-model".to_string());
        mock.expect_get_video_model()
            .returning(|| "test-video-model".to_string());
        mock.expect_get_search_model()
            .returning(|| "test-search-model".to_string());
        mock.expect_get_alarm_interval()
            .returning(|| Duration::from_secs(10));
        mock.expect_get_catch_up_policy()
            .returning(|| CatchUpPolicy::Fire);

        mock
    }

    /// Create a notifier that accepts every notification
    pub fn create_mock_notifier() -> MockNotifier {
        let mut mock = MockNotifier::new();
        mock.expect_notify().returning(|_, _| Ok(()));
        mock
    }

    /// Create a notifier that always fails, as on a platform without one
    pub fn create_failing_notifier() -> MockNotifier {
        let mut mock = MockNotifier::new();
        mock.expect_notify().returning(|_, _| {
            Err(SmartPlanError::ConfigError(
                "Desktop notifications are not supported on this platform".to_string(),
            ))
        });
        mock
    }
}

#[cfg(test)]
mod tests {
    use super::super::traits::*;
    use super::test_helpers::*;
    use std::path::Path;

    #[tokio::test]
    async fn test_create_mock_storage_is_empty() {
        let mock = create_mock_storage();
        assert_eq!(mock.get_item("smart_plan_auth").await.unwrap(), None);
        mock.set_item("smart_plan_auth", "true").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_mock_filesystem_defaults() {
        let mock = create_mock_filesystem();
        assert!(!mock.exists(Path::new("anything")).await);
        mock.write_bytes(Path::new("video.mp4"), &[1, 2, 3]).await.unwrap();
    }

    #[test]
    fn test_create_mock_config() {
        let mock = create_mock_config();
        assert_eq!(mock.get_api_key().unwrap(), "test-api-key");
        assert!(create_mock_config_without_key().get_api_key().is_err());
    }

    #[test]
    fn test_notifier_helpers() {
        assert!(create_mock_notifier().notify("Alarm", "body").is_ok());
        assert!(create_failing_notifier().notify("Alarm", "body").is_err());
    }
}
