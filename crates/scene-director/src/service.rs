//! The generation backend seam.
//!
//! `GenerationService` is the orchestrator's only view of the AI backend:
//! one async operation per mode plus the follow-up operations. Every
//! operation fails with an opaque [`ServiceError`] that callers map to a
//! fixed user-facing message.
//!
//! `HttpGenerationService` is the production implementation, talking to an
//! OpenAI-compatible endpoint over `reqwest`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::DirectorConfig;
use crate::errors::ServiceError;
use crate::forms::{AdvancedForm, FormState, GuidedForm, ImageData, Mode, SunoForm, TranslateForm};
use crate::prompts;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_translate(&self, inputs: &TranslateForm) -> Result<String, ServiceError>;

    async fn generate_guided(&self, inputs: &GuidedForm) -> Result<String, ServiceError>;

    async fn generate_suno(&self, inputs: &SunoForm) -> Result<String, ServiceError>;

    async fn generate_advanced(
        &self,
        inputs: &AdvancedForm,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) -> Result<String, ServiceError>;

    /// Stylistic rewrite of a scene prompt.
    async fn refine(&self, text: &str) -> Result<String, ServiceError>;

    /// Stylistic rewrite of a Suno prompt; lyric structure is preserved.
    async fn refine_suno(&self, text: &str) -> Result<String, ServiceError>;

    /// Fresh take on the same inputs, replacing the prior result wholesale.
    async fn generate_variations(
        &self,
        inputs: &FormState,
        reference_image: Option<ImageData>,
        mode: Mode,
    ) -> Result<String, ServiceError>;

    /// Next scene of an ongoing sequence, written against the full prior text.
    async fn continue_scene(
        &self,
        prior: &str,
        inputs: &AdvancedForm,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) -> Result<String, ServiceError>;

    /// Widescreen 16:9 recreation of a reference image.
    async fn create_widescreen_image(
        &self,
        reference: &ImageData,
    ) -> Result<ImageData, ServiceError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

/// OpenAI-compatible HTTP client for text and image generation.
pub struct HttpGenerationService {
    client: reqwest::Client,
    config: DirectorConfig,
}

impl HttpGenerationService {
    pub fn new(config: DirectorConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// POST one chat completion and extract the text of the first choice.
    async fn chat(&self, preamble: &str, content: Value) -> Result<String, ServiceError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.text_model,
            "messages": [
                { "role": "system", "content": preamble },
                { "role": "user", "content": content },
            ],
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimit(format!("status {status}")));
        }
        if !status.is_success() {
            return Err(ServiceError::Backend(format!("status {status}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::InvalidResponse("empty completion".into()))
    }

    /// Plain-text user content.
    fn text_content(text: String) -> Value {
        Value::String(text)
    }

    /// Multi-part user content: one text part followed by inline images.
    fn multimodal_content(text: String, images: &[Option<&ImageData>]) -> Value {
        let mut parts = vec![json!({ "type": "text", "text": text })];
        for image in images.iter().flatten() {
            parts.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:image/png;base64,{}", image.as_base64()) },
            }));
        }
        Value::Array(parts)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate_translate(&self, inputs: &TranslateForm) -> Result<String, ServiceError> {
        self.chat(
            prompts::TRANSLATE_PREAMBLE,
            Self::text_content(prompts::build_translate_prompt(inputs)),
        )
        .await
    }

    async fn generate_guided(&self, inputs: &GuidedForm) -> Result<String, ServiceError> {
        self.chat(
            prompts::GUIDED_PREAMBLE,
            Self::text_content(prompts::build_guided_prompt(inputs)),
        )
        .await
    }

    async fn generate_suno(&self, inputs: &SunoForm) -> Result<String, ServiceError> {
        self.chat(
            prompts::SUNO_PREAMBLE,
            Self::text_content(prompts::build_suno_prompt(inputs)),
        )
        .await
    }

    async fn generate_advanced(
        &self,
        inputs: &AdvancedForm,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) -> Result<String, ServiceError> {
        self.chat(
            prompts::ADVANCED_PREAMBLE,
            Self::multimodal_content(
                prompts::build_advanced_prompt(inputs),
                &[reference_image.as_ref(), promotional_image.as_ref()],
            ),
        )
        .await
    }

    async fn refine(&self, text: &str) -> Result<String, ServiceError> {
        self.chat(
            prompts::REFINE_PREAMBLE,
            Self::text_content(text.to_string()),
        )
        .await
    }

    async fn refine_suno(&self, text: &str) -> Result<String, ServiceError> {
        self.chat(
            prompts::SUNO_REFINE_PREAMBLE,
            Self::text_content(text.to_string()),
        )
        .await
    }

    async fn generate_variations(
        &self,
        inputs: &FormState,
        reference_image: Option<ImageData>,
        mode: Mode,
    ) -> Result<String, ServiceError> {
        tracing::debug!(%mode, "building variations request");
        self.chat(
            prompts::VARIATIONS_PREAMBLE,
            Self::multimodal_content(
                prompts::build_variations_prompt(inputs),
                &[reference_image.as_ref()],
            ),
        )
        .await
    }

    async fn continue_scene(
        &self,
        prior: &str,
        inputs: &AdvancedForm,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) -> Result<String, ServiceError> {
        self.chat(
            prompts::CONTINUE_SCENE_PREAMBLE,
            Self::multimodal_content(
                prompts::build_continue_scene_prompt(prior, inputs),
                &[reference_image.as_ref(), promotional_image.as_ref()],
            ),
        )
        .await
    }

    async fn create_widescreen_image(
        &self,
        reference: &ImageData,
    ) -> Result<ImageData, ServiceError> {
        let url = format!("{}/images/generations", self.config.base_url);
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompts::WIDESCREEN_IMAGE_PROMPT,
            "image": reference.as_base64(),
            "size": "1792x1024",
            "response_format": "b64_json",
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimit(format!("status {status}")));
        }
        if !status.is_success() {
            return Err(ServiceError::Backend(format!("status {status}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        body["data"][0]["b64_json"]
            .as_str()
            .map(ImageData::new)
            .ok_or_else(|| ServiceError::InvalidResponse("missing image payload".into()))
    }
}
