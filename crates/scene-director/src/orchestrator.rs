//! The generation orchestration state machine.
//!
//! `SessionController` receives user-triggered intents, validates their
//! preconditions, invokes the matching [`GenerationService`] operation, and
//! applies the outcome to the shared [`SessionState`].
//!
//! ## Intents
//!
//! | Intent           | Valid when                                   | Result slot   |
//! |------------------|----------------------------------------------|---------------|
//! | `generate`       | inputs match the active mode                 | replaced      |
//! | `refine`         | result non-empty (no-op otherwise)           | replaced      |
//! | `variations`     | prior inputs exist, mode ≠ Suno              | replaced      |
//! | `continue_scene` | mode = Advanced, result non-empty, live form | appended      |
//! | `switch_mode`    | always                                       | untouched     |
//!
//! The widescreen image task is the one genuinely concurrent operation: it
//! is spawned without being awaited, writes only to the disjoint widescreen
//! slot, and reports failure through a notification, never through the
//! primary error slot.
//!
//! Each primary intent takes a monotonically increasing request id and only
//! applies its completion while that id is still current, so a slow older
//! call can never overwrite newer state. The widescreen task is keyed
//! separately, to a slot epoch that advances only when a transition clears
//! the widescreen slot; intents that leave the slot alone (refine, mode
//! switches) never strand an in-flight image.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::errors::{self, ServiceError};
use crate::forms::{FormState, ImageData, Mode, SceneFormSource};
use crate::notify::{Notification, Notifier};
use crate::service::GenerationService;
use crate::session::SessionState;

/// Drives one authoring session against a generation backend.
pub struct SessionController<S: GenerationService + 'static> {
    service: Arc<S>,
    state: Arc<Mutex<SessionState>>,
    notifier: Notifier,
    request_seq: Arc<AtomicU64>,
    widescreen_seq: Arc<AtomicU64>,
}

impl<S: GenerationService + 'static> SessionController<S> {
    pub fn new(service: S) -> Self {
        Self::with_mode(service, Mode::Advanced)
    }

    pub fn with_mode(service: S, mode: Mode) -> Self {
        Self {
            service: Arc::new(service),
            state: Arc::new(Mutex::new(SessionState::new(mode))),
            notifier: Notifier::default(),
            request_seq: Arc::new(AtomicU64::new(0)),
            widescreen_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// The currently visible notification, if any.
    pub async fn notification(&self) -> Option<Notification> {
        self.notifier.current().await
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn begin_request(&self) -> u64 {
        self.request_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, request: u64) -> bool {
        self.request_seq.load(Ordering::SeqCst) == request
    }

    /// Advance the widescreen slot epoch. Called (under the state lock) by
    /// exactly the transitions that clear the slot, so an in-flight image
    /// task survives every intent that leaves the slot alone.
    fn advance_widescreen_epoch(&self) -> u64 {
        self.widescreen_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ── Intents ──────────────────────────────────────────────────────────

    /// Replace the active mode. Result, error, inputs, and scene count all
    /// carry over, so exploratory mode switches never lose work.
    pub async fn switch_mode(&self, mode: Mode) {
        let mut st = self.state.lock().await;
        info!(from = %st.mode, to = %mode, "mode switched");
        st.mode = mode;
    }

    /// Generate a fresh prompt from a form submission.
    ///
    /// Clears all prior output, records the submission as current, and
    /// dispatches to the service operation matching the inputs variant. In
    /// advanced mode with a reference image, additionally spawns the
    /// widescreen image task after the primary call succeeds.
    pub async fn generate(
        &self,
        inputs: FormState,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) {
        let mode = self.state.lock().await.mode;
        if inputs.mode() != mode {
            warn!(active = %mode, submitted = %inputs.mode(), "inputs rejected");
            self.notifier.error(errors::INPUTS_MODE_MISMATCH).await;
            return;
        }

        let request = self.begin_request();
        let epoch = {
            let mut st = self.state.lock().await;
            st.begin_generate(inputs.clone(), reference_image.clone());
            self.advance_widescreen_epoch()
        };
        info!(%mode, request, "generate dispatched");

        let outcome = self
            .dispatch_generate(&inputs, reference_image.clone(), promotional_image)
            .await;

        let mut st = self.state.lock().await;
        if !self.is_current(request) {
            debug!(request, "stale generate response discarded");
            return;
        }
        match outcome {
            Ok(text) => {
                st.complete(text);
                info!(%mode, request, "generate succeeded");
                if mode == Mode::Advanced {
                    if let Some(reference) = reference_image {
                        st.widescreen.busy = true;
                        drop(st);
                        self.spawn_widescreen_task(reference, epoch);
                    }
                }
            }
            Err(e) => {
                error!(%mode, request, error = %e, "generate failed");
                st.fail(errors::generate_failed(mode));
            }
        }
    }

    /// Stylistic rewrite of the current result. No-op when there is nothing
    /// to refine. Scene count and the widescreen slot stay untouched.
    pub async fn refine(&self) {
        let (request, mode, text) = {
            let mut st = self.state.lock().await;
            if st.result.is_empty() {
                return;
            }
            let request = self.begin_request();
            st.begin_refine();
            (request, st.mode, st.result.clone())
        };
        info!(%mode, request, "refine dispatched");

        // Lyric refinement has different semantics from scene-prompt refinement.
        let outcome = match mode {
            Mode::Suno => self.service.refine_suno(&text).await,
            Mode::Translate | Mode::Guided | Mode::Advanced => self.service.refine(&text).await,
        };

        let mut st = self.state.lock().await;
        if !self.is_current(request) {
            debug!(request, "stale refine response discarded");
            return;
        }
        match outcome {
            Ok(text) => st.complete(text),
            Err(e) => {
                error!(%mode, request, error = %e, "refine failed");
                st.fail(errors::REFINE_FAILED);
            }
        }
    }

    /// Regenerate wholesale from the inputs captured by the last generate.
    ///
    /// Unavailable in Suno mode as a policy restriction; that abort is a
    /// notification, not an error, and never reaches the service.
    pub async fn variations(&self) {
        let (request, mode, inputs, reference_image) = {
            let mut st = self.state.lock().await;
            let Some(inputs) = st.current_inputs.clone() else {
                warn!("variations rejected: no prior inputs");
                st.error = Some(errors::VARIATIONS_NO_INPUTS.into());
                return;
            };
            st.begin_regenerate();
            self.advance_widescreen_epoch();
            if st.mode == Mode::Suno {
                st.busy = false;
                drop(st);
                self.notifier.error(errors::VARIATIONS_SUNO_UNAVAILABLE).await;
                return;
            }
            let request = self.begin_request();
            (request, st.mode, inputs, st.current_reference_image.clone())
        };
        info!(%mode, request, "variations dispatched");

        let outcome = self
            .service
            .generate_variations(&inputs, reference_image, mode)
            .await;

        let mut st = self.state.lock().await;
        if !self.is_current(request) {
            debug!(request, "stale variations response discarded");
            return;
        }
        match outcome {
            Ok(text) => {
                st.complete(text);
                st.scene_count = 1;
            }
            Err(e) => {
                error!(%mode, request, error = %e, "variations failed");
                st.fail(errors::VARIATIONS_FAILED);
            }
        }
    }

    /// Append the next scene, working from the form's live values rather
    /// than the inputs captured at the last generate.
    pub async fn continue_scene(&self, form: &dyn SceneFormSource) {
        let snapshot = form.snapshot();
        let (request, prior, snapshot) = {
            let mut st = self.state.lock().await;
            let preconditions_met = st.mode == Mode::Advanced && !st.result.is_empty();
            let Some(snapshot) = snapshot.filter(|_| preconditions_met) else {
                warn!(mode = %st.mode, "continue-scene rejected");
                drop(st);
                self.notifier
                    .error(errors::CONTINUE_SCENE_REQUIREMENTS)
                    .await;
                return;
            };
            let request = self.begin_request();
            st.begin_regenerate();
            self.advance_widescreen_epoch();
            (request, st.result.clone(), snapshot)
        };
        info!(request, "continue-scene dispatched");

        let outcome = self
            .service
            .continue_scene(
                &prior,
                &snapshot.inputs,
                snapshot.reference_image.clone(),
                snapshot.promotional_image.clone(),
            )
            .await;

        let mut st = self.state.lock().await;
        if !self.is_current(request) {
            debug!(request, "stale continue-scene response discarded");
            return;
        }
        match outcome {
            Ok(text) => {
                st.append_scene(&text, snapshot);
                info!(request, scene = st.scene_count, "scene appended");
            }
            Err(e) => {
                error!(request, error = %e, "continue-scene failed");
                st.fail(errors::CONTINUE_SCENE_FAILED);
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Exhaustive mode-to-operation dispatch over the inputs union.
    async fn dispatch_generate(
        &self,
        inputs: &FormState,
        reference_image: Option<ImageData>,
        promotional_image: Option<ImageData>,
    ) -> Result<String, ServiceError> {
        match inputs {
            FormState::Translate(f) => self.service.generate_translate(f).await,
            FormState::Guided(f) => self.service.generate_guided(f).await,
            FormState::Suno(f) => self.service.generate_suno(f).await,
            FormState::Advanced(f) => {
                self.service
                    .generate_advanced(f, reference_image, promotional_image)
                    .await
            }
        }
    }

    /// Fire-and-forget widescreen image generation.
    ///
    /// Never awaited by the generate intent and never cancelled by later
    /// intents; it writes only to the widescreen slot. Its completion is
    /// keyed to the slot epoch it was spawned under: while that epoch is
    /// current the task always clears `busy`, and once a later transition
    /// has reset the slot (advancing the epoch) the completion is discarded
    /// against an already-cleared slot.
    fn spawn_widescreen_task(&self, reference: ImageData, epoch: u64) {
        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let notifier = self.notifier.clone();
        let seq = Arc::clone(&self.widescreen_seq);

        tokio::spawn(async move {
            let outcome = service.create_widescreen_image(&reference).await;

            let mut st = state.lock().await;
            if seq.load(Ordering::SeqCst) != epoch {
                // A later transition already reset the widescreen slot.
                debug!(epoch, "stale widescreen completion discarded");
                return;
            }
            st.widescreen.busy = false;
            match outcome {
                Ok(image) => {
                    info!(epoch, "widescreen image ready");
                    st.widescreen.image = Some(image);
                }
                Err(e) => {
                    warn!(epoch, error = %e, "widescreen image generation failed");
                    drop(st);
                    notifier.error(errors::WIDESCREEN_FAILED).await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{
        AdvancedForm, AdvancedSnapshot, GuidedForm, SunoForm, TranslateForm,
    };
    use crate::service::MockGenerationService;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Canned backend in the style of a scripted test double: every text
    /// operation succeeds with a recognizable string unless told to fail.
    #[derive(Default)]
    struct StubService {
        fail_generate: bool,
        fail_refine: bool,
        fail_variations: bool,
        fail_continue: bool,
        fail_widescreen: bool,
        widescreen_delay_ms: u64,
        generate_delays_ms: std::sync::Mutex<VecDeque<u64>>,
        generate_calls: AtomicUsize,
        variation_calls: AtomicUsize,
    }

    impl StubService {
        async fn serve_generate(&self, label: &str) -> Result<String, ServiceError> {
            let delay = self
                .generate_delays_ms
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(0);
            let call = self.generate_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.fail_generate {
                return Err(ServiceError::Backend("boom".into()));
            }
            Ok(format!("{label} prompt #{call}"))
        }
    }

    #[async_trait::async_trait]
    impl GenerationService for StubService {
        async fn generate_translate(
            &self,
            _inputs: &TranslateForm,
        ) -> Result<String, ServiceError> {
            self.serve_generate("translated").await
        }

        async fn generate_guided(&self, _inputs: &GuidedForm) -> Result<String, ServiceError> {
            self.serve_generate("guided").await
        }

        async fn generate_suno(&self, _inputs: &SunoForm) -> Result<String, ServiceError> {
            self.serve_generate("suno").await
        }

        async fn generate_advanced(
            &self,
            _inputs: &AdvancedForm,
            _reference_image: Option<ImageData>,
            _promotional_image: Option<ImageData>,
        ) -> Result<String, ServiceError> {
            self.serve_generate("advanced").await
        }

        async fn refine(&self, text: &str) -> Result<String, ServiceError> {
            if self.fail_refine {
                return Err(ServiceError::Backend("boom".into()));
            }
            Ok(format!("refined: {text}"))
        }

        async fn refine_suno(&self, text: &str) -> Result<String, ServiceError> {
            if self.fail_refine {
                return Err(ServiceError::Backend("boom".into()));
            }
            Ok(format!("suno refined: {text}"))
        }

        async fn generate_variations(
            &self,
            _inputs: &FormState,
            _reference_image: Option<ImageData>,
            _mode: Mode,
        ) -> Result<String, ServiceError> {
            self.variation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_variations {
                return Err(ServiceError::Backend("boom".into()));
            }
            Ok("variation prompt".into())
        }

        async fn continue_scene(
            &self,
            _prior: &str,
            _inputs: &AdvancedForm,
            _reference_image: Option<ImageData>,
            _promotional_image: Option<ImageData>,
        ) -> Result<String, ServiceError> {
            if self.fail_continue {
                return Err(ServiceError::Backend("boom".into()));
            }
            Ok("next scene".into())
        }

        async fn create_widescreen_image(
            &self,
            _reference: &ImageData,
        ) -> Result<ImageData, ServiceError> {
            if self.widescreen_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.widescreen_delay_ms)).await;
            }
            if self.fail_widescreen {
                return Err(ServiceError::Backend("no image".into()));
            }
            Ok(ImageData::new("d2lkZQ=="))
        }
    }

    struct LiveForm(AdvancedSnapshot);

    impl SceneFormSource for LiveForm {
        fn snapshot(&self) -> Option<AdvancedSnapshot> {
            Some(self.0.clone())
        }
    }

    struct EmptyForm;

    impl SceneFormSource for EmptyForm {
        fn snapshot(&self) -> Option<AdvancedSnapshot> {
            None
        }
    }

    fn live_form(subject: &str) -> LiveForm {
        LiveForm(AdvancedSnapshot {
            inputs: AdvancedForm {
                subject: subject.into(),
                ..AdvancedForm::default()
            },
            reference_image: Some(ImageData::new("bGl2ZQ==")),
            promotional_image: None,
        })
    }

    fn translate_inputs(text: &str) -> FormState {
        FormState::Translate(TranslateForm {
            source_prompt: text.into(),
        })
    }

    fn advanced_inputs(subject: &str) -> FormState {
        FormState::Advanced(AdvancedForm {
            subject: subject.into(),
            ..AdvancedForm::default()
        })
    }

    #[tokio::test]
    async fn generate_success_sets_result_and_leaves_error_unset() {
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Translate);
        ctrl.generate(translate_inputs("a beach at dusk"), None, None)
            .await;

        let st = ctrl.state().await;
        assert_eq!(st.result, "translated prompt #1");
        assert!(st.error.is_none());
        assert!(!st.busy);
        assert_eq!(st.scene_count, 1);
    }

    #[tokio::test]
    async fn generate_failure_sets_fixed_error_and_clears_result() {
        let service = StubService {
            fail_generate: true,
            ..StubService::default()
        };
        let ctrl = SessionController::with_mode(service, Mode::Suno);
        ctrl.generate(FormState::Suno(SunoForm::default()), None, None)
            .await;

        let st = ctrl.state().await;
        assert!(st.result.is_empty());
        assert_eq!(st.error.as_deref(), Some(errors::generate_failed(Mode::Suno).as_str()));
        assert!(!st.busy);
    }

    #[tokio::test]
    async fn generate_rejects_inputs_for_another_mode() {
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Guided);
        ctrl.generate(translate_inputs("wrong shape"), None, None)
            .await;

        let st = ctrl.state().await;
        assert!(st.result.is_empty());
        assert!(st.error.is_none());
        assert_eq!(ctrl.notifier().emitted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn widescreen_task_requires_advanced_mode_and_reference_image() {
        // Advanced mode, no reference image: slot untouched.
        let ctrl = SessionController::new(StubService::default());
        ctrl.generate(advanced_inputs("a keeper"), None, None).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let st = ctrl.state().await;
        assert!(!st.widescreen.busy);
        assert!(st.widescreen.image.is_none());

        // Translate mode with a (stray) reference image: slot untouched.
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Translate);
        ctrl.generate(
            translate_inputs("a beach"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let st = ctrl.state().await;
        assert!(!st.widescreen.busy);
        assert!(st.widescreen.image.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn widescreen_task_toggles_busy_and_populates_image() {
        let service = StubService {
            widescreen_delay_ms: 40,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);
        ctrl.generate(
            advanced_inputs("a keeper"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;

        let st = ctrl.state().await;
        assert_eq!(st.result, "advanced prompt #1");
        assert!(st.widescreen.busy);
        assert!(st.widescreen.image.is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        let st = ctrl.state().await;
        assert!(!st.widescreen.busy);
        assert_eq!(st.widescreen.image, Some(ImageData::new("d2lkZQ==")));
        assert!(st.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn widescreen_failure_notifies_without_touching_primary_error() {
        let service = StubService {
            fail_widescreen: true,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);
        ctrl.generate(
            advanced_inputs("a keeper"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let st = ctrl.state().await;
        assert_eq!(st.result, "advanced prompt #1");
        assert!(st.error.is_none());
        assert!(!st.widescreen.busy);
        assert!(st.widescreen.image.is_none());
        let notification = ctrl.notification().await.unwrap();
        assert_eq!(notification.text, errors::WIDESCREEN_FAILED);
    }

    #[tokio::test(start_paused = true)]
    async fn refine_leaves_an_inflight_widescreen_task_to_land() {
        let service = StubService {
            widescreen_delay_ms: 100,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);
        ctrl.generate(
            advanced_inputs("a keeper"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;

        // Refine resolves while the image task is still outstanding.
        ctrl.refine().await;
        let st = ctrl.state().await;
        assert_eq!(st.result, "refined: advanced prompt #1");
        assert!(st.widescreen.busy, "refine must not touch the side-task slot");

        tokio::time::sleep(Duration::from_millis(150)).await;
        let st = ctrl.state().await;
        assert!(!st.widescreen.busy);
        assert_eq!(st.widescreen.image, Some(ImageData::new("d2lkZQ==")));
        assert!(st.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_generate_suppresses_the_previous_widescreen_image() {
        let service = StubService {
            widescreen_delay_ms: 100,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);
        ctrl.generate(
            advanced_inputs("first"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;

        // No reference image this time: the slot is reset and stays empty.
        ctrl.generate(advanced_inputs("second"), None, None).await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        let st = ctrl.state().await;
        assert_eq!(st.result, "advanced prompt #2");
        assert!(!st.widescreen.busy);
        assert!(
            st.widescreen.image.is_none(),
            "a superseded image task must not repopulate a reset slot"
        );
    }

    #[tokio::test]
    async fn refine_is_a_noop_on_an_empty_result() {
        // No expectations: any service call would panic.
        let ctrl = SessionController::new(MockGenerationService::new());
        ctrl.refine().await;

        let st = ctrl.state().await;
        assert!(st.result.is_empty());
        assert!(st.error.is_none());
        assert!(!st.busy);
    }

    #[tokio::test]
    async fn refine_dispatches_by_mode() {
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Suno);
        ctrl.generate(FormState::Suno(SunoForm::default()), None, None)
            .await;
        ctrl.refine().await;
        assert_eq!(ctrl.state().await.result, "suno refined: suno prompt #1");

        let ctrl = SessionController::with_mode(StubService::default(), Mode::Guided);
        ctrl.generate(FormState::Guided(GuidedForm::default()), None, None)
            .await;
        ctrl.refine().await;
        assert_eq!(ctrl.state().await.result, "refined: guided prompt #1");
    }

    #[tokio::test]
    async fn refine_failure_keeps_scene_count_and_widescreen() {
        let service = StubService {
            fail_refine: true,
            ..StubService::default()
        };
        let ctrl = SessionController::with_mode(service, Mode::Translate);
        ctrl.generate(translate_inputs("a beach"), None, None).await;
        ctrl.refine().await;

        let st = ctrl.state().await;
        assert_eq!(st.error.as_deref(), Some(errors::REFINE_FAILED));
        assert_eq!(st.scene_count, 1);
    }

    #[tokio::test]
    async fn variations_without_prior_inputs_sets_error() {
        let ctrl = SessionController::new(MockGenerationService::new());
        ctrl.variations().await;

        let st = ctrl.state().await;
        assert_eq!(st.error.as_deref(), Some(errors::VARIATIONS_NO_INPUTS));
        assert!(!st.busy);
        assert_eq!(ctrl.notifier().emitted(), 0);
    }

    #[tokio::test]
    async fn variations_in_suno_mode_is_a_policy_notification() {
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Suno);
        ctrl.generate(FormState::Suno(SunoForm::default()), None, None)
            .await;
        let before = ctrl.state().await.result.clone();

        ctrl.variations().await;

        let st = ctrl.state().await;
        assert_eq!(st.result, before);
        assert!(st.error.is_none());
        assert!(!st.busy);
        assert_eq!(ctrl.notifier().emitted(), 1);
        let notification = ctrl.notification().await.unwrap();
        assert_eq!(notification.text, errors::VARIATIONS_SUNO_UNAVAILABLE);
        assert_eq!(
            ctrl.service.variation_calls.load(Ordering::SeqCst),
            0,
            "policy abort must never reach the service"
        );
    }

    #[tokio::test]
    async fn variations_replace_the_result_and_reset_scene_count() {
        let ctrl = SessionController::new(StubService::default());
        ctrl.generate(advanced_inputs("a keeper"), None, None).await;
        ctrl.continue_scene(&live_form("the keeper")).await;
        assert_eq!(ctrl.state().await.scene_count, 2);

        ctrl.variations().await;

        let st = ctrl.state().await;
        assert_eq!(st.result, "variation prompt");
        assert_eq!(st.scene_count, 1);
        assert!(st.error.is_none());
    }

    #[tokio::test]
    async fn continue_scene_outside_advanced_mode_only_notifies() {
        let ctrl = SessionController::with_mode(MockGenerationService::new(), Mode::Guided);
        ctrl.continue_scene(&live_form("the keeper")).await;

        let st = ctrl.state().await;
        assert!(st.result.is_empty());
        assert!(st.error.is_none());
        assert_eq!(ctrl.notifier().emitted(), 1);
        let notification = ctrl.notification().await.unwrap();
        assert_eq!(notification.text, errors::CONTINUE_SCENE_REQUIREMENTS);
    }

    #[tokio::test]
    async fn continue_scene_requires_a_live_form_snapshot() {
        let ctrl = SessionController::new(StubService::default());
        ctrl.generate(advanced_inputs("a keeper"), None, None).await;

        ctrl.continue_scene(&EmptyForm).await;

        let st = ctrl.state().await;
        assert_eq!(st.result, "advanced prompt #1");
        assert_eq!(st.scene_count, 1);
        assert_eq!(ctrl.notifier().emitted(), 1);
    }

    #[tokio::test]
    async fn continue_scene_appends_a_labeled_scene_and_adopts_the_snapshot() {
        let ctrl = SessionController::new(StubService::default());
        ctrl.generate(advanced_inputs("original subject"), None, None)
            .await;

        ctrl.continue_scene(&live_form("edited subject")).await;

        let st = ctrl.state().await;
        assert_eq!(
            st.result,
            "advanced prompt #1\n\n---\n\nSCENE 2\nnext scene"
        );
        assert_eq!(st.scene_count, 2);
        // A later refine/variations now works from the live snapshot.
        match st.current_inputs {
            Some(FormState::Advanced(ref inputs)) => {
                assert_eq!(inputs.subject, "edited subject")
            }
            ref other => panic!("expected advanced inputs, got {other:?}"),
        }
        assert_eq!(st.current_reference_image, Some(ImageData::new("bGl2ZQ==")));
    }

    #[tokio::test]
    async fn continue_scene_failure_sets_the_fixed_error() {
        let service = StubService {
            fail_continue: true,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);
        ctrl.generate(advanced_inputs("a keeper"), None, None).await;
        ctrl.continue_scene(&live_form("a keeper")).await;

        let st = ctrl.state().await;
        assert_eq!(st.error.as_deref(), Some(errors::CONTINUE_SCENE_FAILED));
        assert_eq!(st.result, "advanced prompt #1");
        assert_eq!(st.scene_count, 1);
    }

    #[tokio::test]
    async fn switch_mode_preserves_all_session_state() {
        let ctrl = SessionController::with_mode(StubService::default(), Mode::Translate);
        ctrl.generate(translate_inputs("a beach"), None, None).await;

        ctrl.switch_mode(Mode::Suno).await;

        let st = ctrl.state().await;
        assert_eq!(st.mode, Mode::Suno);
        assert_eq!(st.result, "translated prompt #1");
        assert!(st.current_inputs.is_some());
        assert_eq!(st.scene_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_generate_cannot_overwrite_a_newer_result() {
        let service = StubService {
            generate_delays_ms: std::sync::Mutex::new(VecDeque::from([100, 0])),
            ..StubService::default()
        };
        let ctrl = SessionController::with_mode(service, Mode::Translate);

        // The first call begins first (lower request id) but resolves last.
        tokio::join!(
            ctrl.generate(translate_inputs("slow"), None, None),
            ctrl.generate(translate_inputs("fast"), None, None),
        );

        let st = ctrl.state().await;
        assert_eq!(st.result, "translated prompt #2");
        assert!(st.error.is_none());
        assert!(!st.busy);
    }

    #[tokio::test(start_paused = true)]
    async fn full_advanced_session_scenario() {
        let service = StubService {
            widescreen_delay_ms: 20,
            ..StubService::default()
        };
        let ctrl = SessionController::new(service);

        ctrl.generate(
            advanced_inputs("a keeper"),
            Some(ImageData::new("cmVm")),
            None,
        )
        .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        let st = ctrl.state().await;
        assert_eq!(st.result, "advanced prompt #1");
        assert!(st.widescreen.image.is_some());

        ctrl.continue_scene(&live_form("a keeper")).await;
        let st = ctrl.state().await;
        assert_eq!(st.scene_count, 2);
        assert!(st.result.contains("\n\n---\n\nSCENE 2\n"));

        ctrl.variations().await;
        let st = ctrl.state().await;
        assert_eq!(st.scene_count, 1);
        assert_eq!(st.result, "variation prompt");
    }
}
