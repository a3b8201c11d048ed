use super::types::*;
use super::{GenAiAdapter, ModelSet};
use crate::error::{Result, SmartPlanError};
use anyhow::Context;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const IMAGE_ASPECT_RATIO: &str = "1:1";

/// Google Generative Language REST adapter
///
/// The key lives behind a lock so the video lab's credential prompt can swap
/// it while the adapter is shared with background tasks.
pub struct GeminiAdapter {
    client: Client,
    base_url: String,
    api_key: RwLock<Option<String>>,
    models: ModelSet,
}

impl GeminiAdapter {
    pub fn new(api_key: Option<String>, models: ModelSet) -> Self {
        Self {
            client: Client::new(),
            base_url: GEMINI_API_URL.to_string(),
            api_key: RwLock::new(api_key.filter(|key| !key.trim().is_empty())),
            models,
        }
    }

    /// Point the adapter at another endpoint (proxies, local fakes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn key(&self) -> Result<String> {
        let guard = self
            .api_key
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().ok_or_else(|| {
            SmartPlanError::EnvError("No API key selected; set GEMINI_API_KEY".to_string())
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.model_url(model, "generateContent"))
            .header(API_KEY_HEADER, self.key()?)
            .json(request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        Self::decode(response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status, &body);
            tracing::error!("Gemini request failed: {}", err);
            return Err(err);
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenAiAdapter for GeminiAdapter {
    async fn generate_image(&self, prompt: &str) -> Result<ImageData> {
        tracing::info!("Generating image with {}", self.models.image);
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
                },
            }),
            tools: None,
        };

        let response = self.generate_content(&self.models.image, &request).await?;
        image_from_response(response)
    }

    async fn edit_image(&self, source: &ImageData, prompt: &str) -> Result<ImageData> {
        tracing::info!(
            "Editing {} image ({} bytes) with {}",
            source.mime_type,
            source.bytes.len(),
            self.models.image
        );
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::inline(source), RequestPart::text(prompt)],
            }],
            generation_config: None,
            tools: None,
        };

        let response = self.generate_content(&self.models.image, &request).await?;
        image_from_response(response)
    }

    async fn start_video(&self, request: &VideoRequest) -> Result<VideoOperation> {
        tracing::info!(
            "Starting video job with {} ({}, {})",
            self.models.video,
            request.aspect_ratio.as_str(),
            request.resolution.as_str()
        );
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                resolution: request.resolution.as_str().to_string(),
            },
        };

        let response = self
            .client
            .post(self.model_url(&self.models.video, "predictLongRunning"))
            .header(API_KEY_HEADER, self.key()?)
            .json(&body)
            .send()
            .await
            .context("Failed to start video generation")?;

        let operation: OperationResponse = Self::decode(response).await?;
        Ok(operation.into_video_operation())
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation> {
        tracing::debug!("Polling video operation {}", operation.name);
        let response = self
            .client
            .get(self.operation_url(&operation.name))
            .header(API_KEY_HEADER, self.key()?)
            .send()
            .await
            .context("Failed to poll video operation")?;

        let polled: OperationResponse = Self::decode(response).await?;
        let mut polled = polled.into_video_operation();
        if polled.name.is_empty() {
            polled.name = operation.name.clone();
        }
        Ok(polled)
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, self.key()?)
            .send()
            .await
            .context("Failed to download video")?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!("Video download returned 404; credential must be re-selected");
            return Err(SmartPlanError::CredentialNotFound);
        }
        if !status.is_success() {
            tracing::error!("Video download failed with {}", status);
            return Err(SmartPlanError::AiError(
                "Failed to fetch the generated video file.".to_string(),
            ));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read video stream")?;
            bytes.extend_from_slice(&chunk);
        }
        tracing::info!("Downloaded video ({} bytes)", bytes.len());
        Ok(bytes)
    }

    async fn search_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::text(prompt)],
            }],
            generation_config: None,
            tools: Some(vec![Tool {
                google_search: GoogleSearch {},
            }]),
        };

        let response = self.generate_content(&self.models.search, &request).await?;
        text_from_response(response)
    }

    fn set_api_key(&self, api_key: String) {
        let mut guard = self
            .api_key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(api_key.trim().to_string()).filter(|key| !key.is_empty());
        tracing::info!("Gemini API key replaced");
    }

    fn has_api_key(&self) -> bool {
        self.key().is_ok()
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

/// Turn a non-success response into an error carrying the service's message
fn api_error(status: StatusCode, body: &str) -> SmartPlanError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == StatusCode::NOT_FOUND && message.contains("Requested entity was not found") {
        return SmartPlanError::CredentialNotFound;
    }
    SmartPlanError::AiError(format!("Gemini API error {}: {}", status.as_u16(), message))
}

fn image_from_response(response: GenerateContentResponse) -> Result<ImageData> {
    let mut text = String::new();
    for part in response.parts() {
        if let Some(inline) = &part.inline_data {
            return ImageData::from_base64(inline.mime_type.clone(), &inline.data);
        }
        if let Some(t) = &part.text {
            text.push_str(t);
        }
    }

    if text.trim().is_empty() {
        Err(SmartPlanError::AiError("No image data returned from the model.".to_string()))
    } else {
        Err(SmartPlanError::AiError(format!(
            "The model returned text instead of an image: {}",
            text.trim()
        )))
    }
}

fn text_from_response(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .parts()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        return Err(SmartPlanError::AiError("No text returned from the model.".to_string()));
    }
    Ok(text)
}

// Internal API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl RequestPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline(image: &ImageData) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    resolution: String,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<ApiStatus>,
    response: Option<OperationResult>,
}

impl OperationResponse {
    fn into_video_operation(self) -> VideoOperation {
        let video_uri = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|sample| sample.video)
            .and_then(|video| video.uri);

        VideoOperation {
            name: self.name,
            done: self.done,
            video_uri,
            error: self.error.map(|e| e.message),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}
