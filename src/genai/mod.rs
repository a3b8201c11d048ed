mod gemini;
mod types;

pub use gemini::{GeminiAdapter, GEMINI_API_URL};
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Generative AI backend used by the labs and the shorts discovery search
///
/// Every call is a single request/response except video, which is a
/// long-running operation: `start_video` returns a handle that is polled with
/// `poll_video` until `done`, then fetched with `download_video`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenAiAdapter: Send + Sync {
    /// Text-to-image, square output
    async fn generate_image(&self, prompt: &str) -> Result<ImageData>;

    /// Transform `source` following the instruction in `prompt`
    async fn edit_image(&self, source: &ImageData, prompt: &str) -> Result<ImageData>;

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation>;

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation>;

    /// Fetch the finished video bytes
    ///
    /// # Errors
    /// - `CredentialNotFound` when the service answers 404 for the key
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>>;

    /// Free-text answer grounded with web search
    async fn search_text(&self, prompt: &str) -> Result<String>;

    /// Install a different API key for subsequent calls
    fn set_api_key(&self, api_key: String);

    fn has_api_key(&self) -> bool;

    /// Get the adapter name for logging/debugging
    fn name(&self) -> &'static str;
}

/// Models used for each kind of request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    pub image: String,
    pub video: String,
    pub search: String,
}

/// Available backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterType {
    #[default]
    Gemini,
}

/// Factory function to create the appropriate adapter
pub fn create_adapter(
    adapter_type: AdapterType,
    api_key: Option<String>,
    models: ModelSet,
) -> Box<dyn GenAiAdapter> {
    match adapter_type {
        AdapterType::Gemini => Box::new(GeminiAdapter::new(api_key, models)),
    }
}
