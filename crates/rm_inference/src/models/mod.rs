use std::sync::Arc;

use rm_core::{Error, Result, SentimentClassifier, Summarizer};

use crate::prompts::FewShotExample;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub few_shots: Vec<FewShotExample>,
}

/// The two annotation roles a model serves, as shareable trait objects.
/// Both handles may point at the same underlying model.
pub struct ModelHandles {
    pub classifier: Arc<dyn SentimentClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Build the configured model. `gemini` needs an API key; `dummy` is the
/// deterministic offline stand-in.
pub fn create_model(config: &ModelConfig) -> Result<ModelHandles> {
    match config.name.as_str() {
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                Error::Configuration("gemini model selected but no API key configured".to_string())
            })?;
            let model = Arc::new(GeminiModel::new(api_key, config.few_shots.clone())?);
            Ok(ModelHandles {
                classifier: model.clone(),
                summarizer: model,
            })
        }
        "dummy" => {
            let model = Arc::new(DummyModel);
            Ok(ModelHandles {
                classifier: model.clone(),
                summarizer: model,
            })
        }
        other => Err(Error::Configuration(format!("unknown model: {other}"))),
    }
}
