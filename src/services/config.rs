// Configuration service implementation
//
// Sensitive data (the API key) comes from the environment or a .env file,
// everything else has a default. The API key is optional at load time: the
// agenda works without it, and the video lab asks for one when it is missing.

use super::traits::ConfigService;
use crate::agenda::{CatchUpPolicy, DEFAULT_ALARM_INTERVAL};
use crate::error::{Result, SmartPlanError};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-3-flash-preview";

/// Environment-backed configuration
///
/// Environment Variables:
/// - GEMINI_API_KEY (optional, falls back to API_KEY)
/// - SMARTPLAN_DATA_DIR (optional): defaults to `<platform data dir>/smartplan`
/// - SMARTPLAN_IMAGE_MODEL / SMARTPLAN_VIDEO_MODEL / SMARTPLAN_SEARCH_MODEL
/// - SMARTPLAN_ALARM_INTERVAL_SECS (optional): defaults to 10
/// - SMARTPLAN_ALARM_CATCH_UP (optional): `fire` (default) or `suppress`
pub struct FileConfigService {
    api_key: Option<String>,
    data_dir: PathBuf,
    image_model: String,
    video_model: String,
    search_model: String,
    alarm_interval: Duration,
    catch_up_policy: CatchUpPolicy,
}

impl FileConfigService {
    /// Load configuration from the environment
    ///
    /// # Errors
    /// - SMARTPLAN_ALARM_INTERVAL_SECS is not a positive integer
    /// - SMARTPLAN_ALARM_CATCH_UP is not `fire` or `suppress`
    /// - No data directory could be determined
    pub fn load() -> Result<Self> {
        // .env.local wins over .env; dotenvy never overrides a set variable
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let data_dir = match std::env::var("SMARTPLAN_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .map(|dir| dir.join("smartplan"))
                .ok_or_else(|| {
                    SmartPlanError::ConfigError(
                        "Could not determine data directory; set SMARTPLAN_DATA_DIR".to_string(),
                    )
                })?,
        };

        let image_model = std::env::var("SMARTPLAN_IMAGE_MODEL")
            .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());
        let video_model = std::env::var("SMARTPLAN_VIDEO_MODEL")
            .unwrap_or_else(|_| DEFAULT_VIDEO_MODEL.to_string());
        let search_model = std::env::var("SMARTPLAN_SEARCH_MODEL")
            .unwrap_or_else(|_| DEFAULT_SEARCH_MODEL.to_string());

        let alarm_interval = match std::env::var("SMARTPLAN_ALARM_INTERVAL_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(SmartPlanError::ConfigError(format!(
                        "SMARTPLAN_ALARM_INTERVAL_SECS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            Err(_) => DEFAULT_ALARM_INTERVAL,
        };

        let catch_up_policy = match std::env::var("SMARTPLAN_ALARM_CATCH_UP") {
            Ok(raw) => CatchUpPolicy::parse(&raw).ok_or_else(|| {
                SmartPlanError::ConfigError(format!(
                    "SMARTPLAN_ALARM_CATCH_UP must be 'fire' or 'suppress', got '{}'",
                    raw
                ))
            })?,
            Err(_) => CatchUpPolicy::default(),
        };

        Ok(Self {
            api_key,
            data_dir,
            image_model,
            video_model,
            search_model,
            alarm_interval,
            catch_up_policy,
        })
    }

    /// Replace the API key resolved from the environment
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }
}

impl ConfigService for FileConfigService {
    fn get_api_key(&self) -> Result<String> {
        self.api_key.clone().ok_or_else(|| {
            SmartPlanError::EnvError(
                "GEMINI_API_KEY environment variable not set".to_string(),
            )
        })
    }

    fn get_data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn get_image_model(&self) -> String {
        self.image_model.clone()
    }

    fn get_video_model(&self) -> String {
        self.video_model.clone()
    }

    fn get_search_model(&self) -> String {
        self.search_model.clone()
    }

    fn get_alarm_interval(&self) -> Duration {
        self.alarm_interval
    }

    fn get_catch_up_policy(&self) -> CatchUpPolicy {
        self.catch_up_policy
    }
}
