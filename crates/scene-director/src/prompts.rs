//! System preambles and prompt builders for each generation operation.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever preamble content
//! changes, so logs can trace which prompt version produced a given result.

use crate::forms::{AdvancedForm, FormState, GuidedForm, SunoForm, TranslateForm};

/// Prompt version. Bump on any preamble content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Translate mode preamble: rewrite free text into a production-ready prompt.
pub const TRANSLATE_PREAMBLE: &str = "\
You are a senior prompt engineer for generative video models. The user gives \
you a rough prompt in their own words, possibly not in English. Rewrite it as \
one polished English video-generation prompt: concrete subject, setting, \
camera work, lighting, and mood. Keep every detail the user asked for, add \
nothing that contradicts it, and answer with the prompt text only.";

/// Guided mode preamble: expand role / action / goal into a full scene.
pub const GUIDED_PREAMBLE: &str = "\
You are a film director writing a video-generation prompt from a short brief. \
The brief names a subject (who), an action (what they do), and a goal (the \
feeling or outcome the shot should land). Write one richly detailed scene \
prompt that covers framing, movement, light, and atmosphere. Answer with the \
prompt text only.";

/// Advanced mode preamble: honor every cinematography field exactly.
pub const ADVANCED_PREAMBLE: &str = "\
You are a cinematographer turning a structured shot sheet into one \
video-generation prompt. Every provided field is a hard requirement: subject, \
environment, shot size, camera angle and movement, lighting, visual style, \
film stock, keywords, mood, scene length, and transition. If dialogue lines \
are provided, include them as a timed script block. If a reference image is \
attached, match its composition and palette. Answer with the prompt text only.";

/// Suno mode preamble: produce a song prompt, not a video prompt.
pub const SUNO_PREAMBLE: &str = "\
You are a music producer writing a Suno song prompt. Combine the style tags, \
thematic context, and lyric theme into a single generation prompt. When \
lyrics are provided, keep them verbatim and format them with section markers. \
When the instrumental flag is set, write no lyrics at all. Answer with the \
prompt text only.";

/// Refine ("enchant") preamble for scene prompts.
pub const REFINE_PREAMBLE: &str = "\
You are polishing an existing video-generation prompt. Keep its structure, \
subjects, and every stated requirement, but sharpen the language: stronger \
verbs, precise cinematography vocabulary, no filler. Answer with the improved \
prompt text only.";

/// Refine preamble for Suno prompts; lyric semantics differ from scene prose.
pub const SUNO_REFINE_PREAMBLE: &str = "\
You are polishing an existing Suno song prompt. Preserve the style tags and \
the lyric structure exactly; improve flow, rhyme, and imagery inside the \
existing sections. Never add or remove sections. Answer with the improved \
prompt text only.";

/// Variations preamble: same inputs, a fresh take.
pub const VARIATIONS_PREAMBLE: &str = "\
You are generating an alternative take on a scene brief. Using the same \
inputs, write a new video-generation prompt that differs clearly in framing, \
light, or staging while honoring every stated requirement. Answer with the \
prompt text only.";

/// Continue-scene preamble: the next scene must cut together with the prior ones.
pub const CONTINUE_SCENE_PREAMBLE: &str = "\
You are writing the next scene of an ongoing sequence. You receive the full \
prompt text of every scene so far plus the current shot sheet. Write one new \
scene prompt that continues the story and keeps visual continuity: same \
subjects, wardrobe, palette, and world. Do not repeat or rewrite earlier \
scenes. Answer with the new scene's prompt text only.";

/// Instruction for the widescreen image operation.
pub const WIDESCREEN_IMAGE_PROMPT: &str = "\
Recreate the attached reference image as a cinematic 16:9 widescreen frame. \
Keep the subject, composition, and palette; extend the scene naturally to \
fill the wider canvas.";

// ── Builders ─────────────────────────────────────────────────────────────────

pub fn build_translate_prompt(inputs: &TranslateForm) -> String {
    format!("Source prompt:\n{}", inputs.source_prompt)
}

pub fn build_guided_prompt(inputs: &GuidedForm) -> String {
    format!(
        "Subject: {}\nAction: {}\nGoal: {}",
        inputs.role, inputs.action, inputs.goal
    )
}

pub fn build_suno_prompt(inputs: &SunoForm) -> String {
    let mut out = String::new();
    push_field(&mut out, "Style tags", &inputs.style_tags.join(", "));
    push_field(&mut out, "Thematic context", &inputs.thematic_context);
    push_field(&mut out, "Lyric theme", &inputs.lyric_theme);
    if inputs.is_instrumental {
        out.push_str("Instrumental: yes (no lyrics)\n");
    } else {
        push_field(&mut out, "Lyrics", &inputs.lyrics);
    }
    out
}

pub fn build_advanced_prompt(inputs: &AdvancedForm) -> String {
    let mut out = String::new();
    push_field(&mut out, "Subject", &inputs.subject);
    push_field(&mut out, "Environment", &inputs.environment);
    push_field(&mut out, "Shot size", &inputs.shot_size);
    push_field(&mut out, "Camera angle", &inputs.camera_angle);
    push_field(&mut out, "Camera movement", &inputs.camera_movement);
    push_field(&mut out, "Lighting style", &inputs.lighting_style);
    push_field(&mut out, "Visual style", &inputs.visual_style);
    push_field(&mut out, "Film stock", &inputs.film_stock);
    push_field(&mut out, "Keywords", &inputs.keywords);
    push_field(&mut out, "Mood", &inputs.mood);
    push_field(&mut out, "Scene length", &inputs.scene_length);
    push_field(&mut out, "Transition", &inputs.transition);
    push_field(&mut out, "Reasoning style", &inputs.reasoning_style);
    push_field(
        &mut out,
        "Knowledge topic",
        &inputs.generated_knowledge_topic,
    );
    if !inputs.dialogue_lines.is_empty() {
        out.push_str("Dialogue script:\n");
        for line in &inputs.dialogue_lines {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                line.timestamp, line.speaker, line.line
            ));
        }
    }
    out
}

/// Render any mode's inputs for the variations operation.
pub fn build_variations_prompt(inputs: &FormState) -> String {
    let rendered = match inputs {
        FormState::Translate(f) => build_translate_prompt(f),
        FormState::Guided(f) => build_guided_prompt(f),
        FormState::Advanced(f) => build_advanced_prompt(f),
        FormState::Suno(f) => build_suno_prompt(f),
    };
    format!("Original brief:\n{rendered}")
}

pub fn build_continue_scene_prompt(prior: &str, inputs: &AdvancedForm) -> String {
    format!(
        "Scenes so far:\n{prior}\n\nShot sheet for the next scene:\n{}",
        build_advanced_prompt(inputs)
    )
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{label}: {value}\n"));
    }
}
