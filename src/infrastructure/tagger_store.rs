// Tagger model storage - Load a saved model or train one from the bundled corpus
use crate::application::tagger::{parse_tagged_corpus, PerceptronTagger, TaggerModel, TrainingOptions};
use crate::infrastructure::config::TaggerSettings;
use anyhow::{Context, Result};
use std::path::Path;

/// Penn Treebank tagged seed corpus, one sentence per line
pub const SEED_CORPUS: &str = include_str!("../../data/seed_corpus.txt");

pub fn training_options(settings: &TaggerSettings) -> TrainingOptions {
    TrainingOptions {
        iterations: settings.training_iterations,
        min_frequency: settings.min_tagdict_frequency,
        ambiguity_threshold: settings.tagdict_ambiguity,
    }
}

pub fn train_seed_tagger(options: TrainingOptions) -> Result<PerceptronTagger> {
    let sentences = parse_tagged_corpus(SEED_CORPUS).context("Bundled seed corpus is malformed")?;
    tracing::info!(
        "Training tagger on {} seed sentences ({} iterations)",
        sentences.len(),
        options.iterations
    );
    Ok(PerceptronTagger::train(&sentences, options)?)
}

pub fn load_model(path: &Path) -> Result<PerceptronTagger> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read tagger model {}", path.display()))?;
    let model: TaggerModel = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse tagger model {}", path.display()))?;
    Ok(PerceptronTagger::from_model(model))
}

pub fn save_model(tagger: &PerceptronTagger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec(&tagger.to_model())?;
    std::fs::write(path, json).with_context(|| format!("Failed to write tagger model {}", path.display()))?;
    Ok(())
}

/// Tagger for the text analysis service.
///
/// Loads `model_path` when it exists; otherwise trains on the seed corpus
/// and, when a path is configured, saves the result there.
pub fn prepare_tagger(settings: &TaggerSettings) -> Result<PerceptronTagger> {
    match &settings.model_path {
        Some(path) if path.exists() => {
            tracing::info!("Loading tagger model from {}", path.display());
            load_model(path)
        }
        Some(path) => {
            let tagger = train_seed_tagger(training_options(settings))?;
            save_model(&tagger, path)?;
            tracing::info!("Saved trained tagger model to {}", path.display());
            Ok(tagger)
        }
        None => train_seed_tagger(training_options(settings)),
    }
}
