use crate::error::{Result, SmartPlanError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Raw image bytes plus their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build from file contents, sniffing the format from the bytes
    pub fn from_file_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).map_err(|e| {
            SmartPlanError::InvalidInput(format!("Unrecognized image file: {}", e))
        })?;
        Ok(Self::new(format.to_mime_type(), bytes))
    }

    /// Decode a base64 payload as returned inline by the API
    pub fn from_base64(mime_type: impl Into<String>, data: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(data.trim())
            .map_err(|e| SmartPlanError::AiError(format!("Invalid image payload: {}", e)))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parse `data:<mime>;base64,<payload>`
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| SmartPlanError::InvalidInput("Not a data URL".to_string()))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| SmartPlanError::InvalidInput("Data URL is not base64".to_string()))?;
        Self::from_base64(mime_type, payload)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension for saving this image
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Video frame orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "Landscape (16:9)",
            AspectRatio::Portrait => "Portrait (9:16)",
        }
    }
}

/// Output video quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    Hd,
    #[serde(rename = "1080p")]
    FullHd,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd => "720p",
            Resolution::FullHd => "1080p",
        }
    }
}

/// Parameters for a text-to-video job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }
}

/// Handle on a long-running video generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoOperation {
    /// Server-side operation name, used to poll
    pub name: String,
    pub done: bool,
    /// Download locator once the job finished successfully
    pub video_uri: Option<String>,
    /// Failure reported by the service for a finished job
    pub error: Option<String>,
}

impl VideoOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_parsing() {
        let image = ImageData::from_data_url("data:image/png;base64,AAEC").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0, 1, 2]);
        assert_eq!(image.to_data_url(), "data:image/png;base64,AAEC");
    }

    #[test]
    fn test_data_url_rejects_plain_urls() {
        assert!(ImageData::from_data_url("https://example.com/a.png").is_err());
        assert!(ImageData::from_data_url("data:image/png,rawbytes").is_err());
    }

    #[test]
    fn test_from_file_bytes_sniffs_png() {
        let png_header = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let image = ImageData::from_file_bytes(png_header).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn test_from_file_bytes_rejects_text() {
        assert!(ImageData::from_file_bytes(b"hello".to_vec()).is_err());
    }

    #[test]
    fn test_video_option_wire_names() {
        assert_eq!(AspectRatio::Portrait.as_str(), "9:16");
        assert_eq!(Resolution::FullHd.as_str(), "1080p");
        assert_eq!(serde_json::to_string(&AspectRatio::Landscape).unwrap(), "\"16:9\"");
    }
}
