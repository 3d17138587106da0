//! Generation orchestration core for the scene prompt-authoring assistant.
//!
//! Users fill structured forms describing a video or music scene; this crate
//! tracks the active authoring mode, dispatches the matching generation
//! operation, chains follow-ups (refine, variations, scene continuation)
//! against prior output, and runs the widescreen-image side task without
//! blocking the primary result.
//!
//! ## Modules
//!
//! | Module         | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `forms`        | Mode set, per-mode input shapes, image payloads    |
//! | `service`      | `GenerationService` seam + HTTP implementation     |
//! | `orchestrator` | `SessionController` — the intent state machine     |
//! | `session`      | Shared session state and its transitions           |
//! | `notify`       | Auto-expiring user notifications                   |
//! | `prompts`      | Per-operation preambles and prompt builders        |
//! | `errors`       | Backend error taxonomy, fixed user-facing messages |
//! | `config`       | Env-driven backend configuration                   |

pub mod config;
pub mod errors;
pub mod forms;
pub mod notify;
pub mod orchestrator;
pub mod prompts;
pub mod service;
pub mod session;

// Convenience re-exports for embedding UIs.
pub use config::DirectorConfig;
pub use errors::ServiceError;
pub use forms::{
    AdvancedForm, AdvancedSnapshot, DialogueLine, FormState, GuidedForm, ImageData, Mode,
    PromptHistoryItem, SceneFormSource, SunoForm, TranslateForm,
};
pub use notify::{Notification, NotificationKind, Notifier};
pub use orchestrator::SessionController;
pub use service::{GenerationService, HttpGenerationService};
pub use session::{SessionState, WidescreenState};
