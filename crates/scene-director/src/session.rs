//! Session state for one authoring session.
//!
//! All primary-intent mutation happens through the small transition helpers
//! here, so the orchestration rules stay unit-testable without a service or
//! UI harness. The controller owns the single shared instance.

use serde::{Deserialize, Serialize};

use crate::forms::{AdvancedSnapshot, FormState, ImageData, Mode};

/// Lifecycle slot for the widescreen image side task.
///
/// Fully independent from the primary result and error slots: the side task
/// resolves to either a populated image or an untouched `None`, never an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidescreenState {
    pub busy: bool,
    pub image: Option<ImageData>,
}

/// Everything one authoring session tracks between intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The active authoring mode. Switching never clears other state.
    pub mode: Mode,
    /// True while a primary intent's service call is outstanding.
    pub busy: bool,
    /// The accumulated prompt text.
    pub result: String,
    /// Fixed user-facing message from the last failed intent, if any.
    pub error: Option<String>,
    /// Inputs captured by the last generate (or adopted by continue-scene).
    pub current_inputs: Option<FormState>,
    /// Reference image captured alongside `current_inputs`.
    pub current_reference_image: Option<ImageData>,
    /// 1-based scene counter; above 1 only after successful continue-scene.
    pub scene_count: u32,
    /// Side-task slot for the widescreen image.
    pub widescreen: WidescreenState,
}

impl SessionState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            busy: false,
            result: String::new(),
            error: None,
            current_inputs: None,
            current_reference_image: None,
            scene_count: 1,
            widescreen: WidescreenState::default(),
        }
    }

    /// Entry transition for a generate intent: wipe prior output, adopt the
    /// submission as current, reset the scene counter and the side-task slot.
    pub fn begin_generate(&mut self, inputs: FormState, reference_image: Option<ImageData>) {
        self.busy = true;
        self.error = None;
        self.result.clear();
        self.scene_count = 1;
        self.widescreen = WidescreenState::default();
        self.current_inputs = Some(inputs);
        self.current_reference_image = reference_image;
    }

    /// Entry transition for refine: prior result, scene counter, and the
    /// side-task slot all stay.
    pub fn begin_refine(&mut self) {
        self.busy = true;
        self.error = None;
    }

    /// Entry transition for variations and continue-scene: the side-task
    /// slot is cleared, the result stays until the call resolves.
    pub fn begin_regenerate(&mut self) {
        self.busy = true;
        self.error = None;
        self.widescreen = WidescreenState::default();
    }

    /// Successful completion: the intent either replaces or has already
    /// appended to `result`; the error slot stays empty.
    pub fn complete(&mut self, result: String) {
        self.result = result;
        self.busy = false;
    }

    /// Failed completion: one fixed message, never the raw error.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.busy = false;
    }

    /// Append the next scene under a `SCENE {n}` label and adopt the live
    /// form snapshot as the new current inputs.
    pub fn append_scene(&mut self, scene_text: &str, snapshot: AdvancedSnapshot) {
        let next = self.scene_count + 1;
        self.result = format!("{}\n\n---\n\nSCENE {next}\n{scene_text}", self.result);
        self.scene_count = next;
        self.current_reference_image = snapshot.reference_image.clone();
        self.current_inputs = Some(FormState::Advanced(snapshot.inputs));
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{AdvancedForm, TranslateForm};

    #[test]
    fn begin_generate_resets_everything_produced_before() {
        let mut state = SessionState::new(Mode::Advanced);
        state.result = "old prompt".into();
        state.error = Some("old error".into());
        state.scene_count = 4;
        state.widescreen.image = Some(ImageData::new("aGk="));

        state.begin_generate(FormState::Translate(TranslateForm::default()), None);

        assert!(state.busy);
        assert!(state.result.is_empty());
        assert!(state.error.is_none());
        assert_eq!(state.scene_count, 1);
        assert_eq!(state.widescreen, WidescreenState::default());
        assert!(state.current_inputs.is_some());
    }

    #[test]
    fn begin_refine_keeps_result_and_widescreen() {
        let mut state = SessionState::new(Mode::Suno);
        state.result = "a song prompt".into();
        state.widescreen.image = Some(ImageData::new("aGk="));

        state.begin_refine();

        assert!(state.busy);
        assert_eq!(state.result, "a song prompt");
        assert!(state.widescreen.image.is_some());
    }

    #[test]
    fn append_scene_uses_the_delimited_template() {
        let mut state = SessionState::new(Mode::Advanced);
        state.result = "R".into();
        state.scene_count = 1;

        let snapshot = AdvancedSnapshot {
            inputs: AdvancedForm {
                subject: "the keeper".into(),
                ..AdvancedForm::default()
            },
            reference_image: Some(ImageData::new("cmVm")),
            promotional_image: None,
        };
        state.append_scene("the storm hits", snapshot);

        assert_eq!(state.result, "R\n\n---\n\nSCENE 2\nthe storm hits");
        assert_eq!(state.scene_count, 2);
        assert_eq!(state.current_reference_image, Some(ImageData::new("cmVm")));
        match state.current_inputs {
            Some(FormState::Advanced(ref inputs)) => assert_eq!(inputs.subject, "the keeper"),
            ref other => panic!("expected advanced inputs, got {other:?}"),
        }
    }

    #[test]
    fn fail_sets_exactly_one_of_result_or_error() {
        let mut state = SessionState::new(Mode::Guided);
        state.begin_generate(FormState::Translate(TranslateForm::default()), None);
        state.fail("it broke");
        assert!(state.result.is_empty());
        assert_eq!(state.error.as_deref(), Some("it broke"));
        assert!(!state.busy);
    }
}
