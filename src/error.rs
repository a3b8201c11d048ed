// Centralized error handling using thiserror for type-safe error management
//
// Every fallible operation in the dashboard returns SmartPlanError. The UI
// never treats an error as fatal: it renders the Display string next to the
// control that triggered the call and lets the user retry.
//
// CredentialNotFound is the one variant the UI matches on explicitly: the
// video lab uses it to drop back to the credential prompt.

use thiserror::Error;

/// Main error type for SmartPlan
///
/// Usage:
///     fn load_agenda(raw: &str) -> Result<Vec<AgendaItem>> {
///         serde_json::from_str(raw).map_err(|e| SmartPlanError::StorageError(
///             format!("Failed to parse agenda: {}", e)
///         ))
///     }
#[derive(Debug, Error)]
pub enum SmartPlanError {
    /// Storage/persistence error
    ///
    /// Reading or writing the key/value store, or decoding a stored value.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable not found or invalid
    #[error("Environment error: {0}")]
    EnvError(String),

    /// Generative AI service error
    ///
    /// Non-success HTTP status, malformed payload, or a response that did not
    /// contain the expected asset. The message is shown to the user verbatim.
    #[error("{0}")]
    AiError(String),

    /// The access credential was rejected or the requested entity is gone
    ///
    /// Raised when downloading a generated video returns 404. The UI resets
    /// its credential-selected flag when it sees this variant.
    #[error("Requested entity was not found. Please re-select your API key.")]
    CredentialNotFound,

    /// Input rejected before any work was done
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO operation failed (file, network, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// HTTP request failed
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl SmartPlanError {
    /// True when this failure means the API credential must be re-selected
    pub fn is_credential_failure(&self) -> bool {
        match self {
            SmartPlanError::CredentialNotFound => true,
            other => other.to_string().contains("Requested entity was not found"),
        }
    }
}

/// Type alias for Result with SmartPlanError
pub type Result<T> = std::result::Result<T, SmartPlanError>;

// Conversion from anyhow::Error for the application edge (main.rs)
impl From<anyhow::Error> for SmartPlanError {
    fn from(err: anyhow::Error) -> Self {
        SmartPlanError::AiError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SmartPlanError::StorageError("Failed to save".to_string());
        assert_eq!(err.to_string(), "Storage error: Failed to save");

        let err = SmartPlanError::AiError("No image returned".to_string());
        assert_eq!(err.to_string(), "No image returned");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SmartPlanError = io_err.into();

        match err {
            SmartPlanError::IoError(_) => {}
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_credential_failure_detection() {
        assert!(SmartPlanError::CredentialNotFound.is_credential_failure());

        let wrapped = SmartPlanError::AiError(
            "Video API error 404: Requested entity was not found.".to_string(),
        );
        assert!(wrapped.is_credential_failure());

        let other = SmartPlanError::AiError("quota exceeded".to_string());
        assert!(!other.is_credential_failure());
    }
}
