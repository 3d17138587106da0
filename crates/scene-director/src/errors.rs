//! Backend error taxonomy and the fixed user-facing message catalog.
//!
//! The orchestrator never inspects a `ServiceError` beyond logging it; every
//! failed intent surfaces one fixed, intent-appropriate message instead of
//! the raw error.

use thiserror::Error;

use crate::forms::Mode;

/// Opaque failure from the generation backend.
///
/// Callers catch and map; only logs ever carry the detail strings.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure or non-success status from the backend.
    #[error("backend failure: {0}")]
    Backend(String),

    /// API rate limit from the backend.
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// The backend answered with a body the client could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration is invalid or missing required fields.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Any other error that doesn't fit the above categories.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

// ── User-facing messages ─────────────────────────────────────────────────────
//
// One fixed message per failure site. The UI shows these verbatim, so they
// stay free of error internals.

pub const REFINE_FAILED: &str = "Could not refine the current prompt. Please try again.";
pub const VARIATIONS_FAILED: &str = "Could not generate variations. Please try again.";
pub const VARIATIONS_NO_INPUTS: &str = "No inputs available to generate variations from.";
pub const VARIATIONS_SUNO_UNAVAILABLE: &str = "Variations are not available in Suno mode.";
pub const CONTINUE_SCENE_FAILED: &str = "Could not generate the next scene. Please try again.";
pub const CONTINUE_SCENE_REQUIREMENTS: &str =
    "Continuing a scene requires advanced mode and an initial prompt.";
pub const WIDESCREEN_FAILED: &str = "The AI could not create a 16:9 image.";
pub const INPUTS_MODE_MISMATCH: &str = "Submitted inputs do not match the active mode.";

/// Fixed message for a failed generate in the given mode.
pub fn generate_failed(mode: Mode) -> String {
    format!(
        "Could not generate a {} prompt. Check the API key and try again.",
        mode.label()
    )
}
