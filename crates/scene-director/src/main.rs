use anyhow::Result;
use clap::Parser;
use tracing::info;

use scene_director::{
    AdvancedForm, DirectorConfig, FormState, GuidedForm, HttpGenerationService, ImageData, Mode,
    SessionController, SunoForm, TranslateForm,
};

/// One-shot prompt generation against the configured backend.
#[derive(Debug, Parser)]
#[command(name = "scene-director")]
struct Args {
    /// Authoring mode to generate in.
    #[arg(long, value_enum, default_value_t = Mode::Advanced)]
    mode: Mode,

    /// Scene description (fills the mode's primary field).
    brief: String,

    /// Base64 file with a reference image (advanced mode only).
    #[arg(long)]
    reference_image: Option<std::path::PathBuf>,
}

fn inputs_for(mode: Mode, brief: String) -> FormState {
    match mode {
        Mode::Translate => FormState::Translate(TranslateForm {
            source_prompt: brief,
        }),
        Mode::Guided => FormState::Guided(GuidedForm {
            action: brief,
            ..GuidedForm::default()
        }),
        Mode::Advanced => FormState::Advanced(AdvancedForm {
            subject: brief,
            ..AdvancedForm::default()
        }),
        Mode::Suno => FormState::Suno(SunoForm {
            lyric_theme: brief,
            ..SunoForm::default()
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = DirectorConfig::default();
    info!(base_url = %config.base_url, model = %config.text_model, "scene-director starting");

    let reference_image = match &args.reference_image {
        Some(path) => Some(ImageData::new(std::fs::read_to_string(path)?.trim())),
        None => None,
    };

    let service = HttpGenerationService::new(config)?;
    let controller = SessionController::with_mode(service, args.mode);
    controller
        .generate(inputs_for(args.mode, args.brief), reference_image, None)
        .await;

    let state = controller.state().await;
    match state.error {
        Some(message) => anyhow::bail!(message),
        None => {
            println!("{}", state.result);
            Ok(())
        }
    }
}
