//! Runtime configuration for the generation backend.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment variable overrides (e.g. `SCENE_DIRECTOR_TEXT_MODEL`)
//! 2. Built-in defaults

use std::time::Duration;

/// Default OpenAI-compatible endpoint base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";
/// Default text-generation model alias.
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default image-generation model alias.
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Per-request timeout toward the backend.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const ENV_BASE_URL: &str = "SCENE_DIRECTOR_BASE_URL";
const ENV_API_KEY: &str = "SCENE_DIRECTOR_API_KEY";
const ENV_TEXT_MODEL: &str = "SCENE_DIRECTOR_TEXT_MODEL";
const ENV_IMAGE_MODEL: &str = "SCENE_DIRECTOR_IMAGE_MODEL";

/// Backend endpoint configuration.
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Base URL for the OpenAI-compatible API.
    pub base_url: String,
    /// API key — local servers accept any non-empty value.
    pub api_key: String,
    /// Model used for every text operation.
    pub text_model: String,
    /// Model used for the widescreen image operation.
    pub image_model: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            api_key: std::env::var(ENV_API_KEY).unwrap_or_else(|_| "local".into()),
            text_model: std::env::var(ENV_TEXT_MODEL).unwrap_or_else(|_| DEFAULT_TEXT_MODEL.into()),
            image_model: std::env::var(ENV_IMAGE_MODEL)
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.into()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
