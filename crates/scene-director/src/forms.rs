//! Domain types shared between the form layer and the orchestrator.
//!
//! Each authoring mode collects its own input shape; the shapes meet in the
//! `FormState` tagged union so mode dispatch is exhaustive at compile time.
//!
//! ## Key types
//!
//! | Type               | Produced by        | Consumed by                  |
//! |--------------------|--------------------|------------------------------|
//! | `FormState`        | Mode form (submit) | `SessionController::generate`|
//! | `AdvancedSnapshot` | Advanced form (live query) | `continue_scene`     |
//! | `ImageData`        | File picker        | Advanced generation, widescreen task |

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Mode ─────────────────────────────────────────────────────────────────────

/// The active authoring workflow.
///
/// Each variant maps to one input shape and one set of generation operations.
/// Exactly one mode is active per session; switching modes never clears
/// session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Free-text prompt translated and enriched into a scene prompt.
    Translate,
    /// Role / action / goal framing for users new to prompt writing.
    Guided,
    /// Full cinematography form with optional reference imagery.
    Advanced,
    /// Song prompt authoring (lyrics, style tags, instrumental flag).
    Suno,
}

impl Mode {
    /// User-facing label for messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Guided => "guided",
            Self::Advanced => "advanced",
            Self::Suno => "Suno",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Image payloads ───────────────────────────────────────────────────────────

/// Binary image payload carried as a text-safe base64 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData(String);

impl ImageData {
    pub fn new(base64: impl Into<String>) -> Self {
        Self(base64.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

// ── Per-mode input shapes ────────────────────────────────────────────────────

/// Translate mode: a single source prompt to rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateForm {
    pub source_prompt: String,
}

/// Guided mode: who, does what, to what end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidedForm {
    pub role: String,
    pub action: String,
    pub goal: String,
}

/// One scripted line in the advanced form's dialogue table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub id: u32,
    pub speaker: String,
    pub line: String,
    pub timestamp: String,
}

/// Advanced mode: the full cinematography field set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedForm {
    pub subject: String,
    pub environment: String,
    pub shot_size: String,
    pub camera_angle: String,
    pub camera_movement: String,
    pub lighting_style: String,
    pub visual_style: String,
    pub film_stock: String,
    pub keywords: String,
    pub dialogue_lines: Vec<DialogueLine>,
    pub mood: String,
    pub scene_length: String,
    pub transition: String,
    pub reasoning_style: String,
    pub generated_knowledge_topic: String,
}

/// Suno mode: song prompt inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunoForm {
    pub lyrics: String,
    pub style_tags: Vec<String>,
    pub thematic_context: String,
    pub is_instrumental: bool,
    pub lyric_theme: String,
}

// ── FormState union ──────────────────────────────────────────────────────────

/// Validated submission from whichever mode form is active.
///
/// The variant set mirrors [`Mode`] one-to-one; a new mode cannot compile
/// until every dispatch site handles its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormState {
    Translate(TranslateForm),
    Guided(GuidedForm),
    Advanced(AdvancedForm),
    Suno(SunoForm),
}

impl FormState {
    /// The mode whose form produced these inputs.
    pub fn mode(&self) -> Mode {
        match self {
            Self::Translate(_) => Mode::Translate,
            Self::Guided(_) => Mode::Guided,
            Self::Advanced(_) => Mode::Advanced,
            Self::Suno(_) => Mode::Suno,
        }
    }
}

// ── Advanced form live snapshot ──────────────────────────────────────────────

/// The advanced form's current field values and images, read at call time.
///
/// Continue-scene works from these live values rather than the inputs
/// captured at the last generate, so edits made between scenes take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSnapshot {
    pub inputs: AdvancedForm,
    pub reference_image: Option<ImageData>,
    pub promotional_image: Option<ImageData>,
}

/// Synchronous query the advanced form component exposes to the orchestrator.
///
/// Returns `None` when no retrievable state exists (form unmounted or not
/// yet filled), which continue-scene treats as a precondition failure.
pub trait SceneFormSource {
    fn snapshot(&self) -> Option<AdvancedSnapshot>;
}

// ── History ──────────────────────────────────────────────────────────────────

/// One saved prompt. Serialized by the (external) history panel; the
/// orchestrator itself never reads or writes these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptHistoryItem {
    pub id: String,
    pub prompt: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PromptHistoryItem {
    pub fn new(prompt: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: format!("prompt-{now}"),
            prompt: prompt.into(),
            timestamp: now,
        }
    }
}
