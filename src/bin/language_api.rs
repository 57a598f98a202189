// Image conversion and text analysis service entry point
use std::sync::Arc;

use utility_services::application::text_analysis_service::TextAnalysisService;
use utility_services::application::tokenizer::WordTokenizer;
use utility_services::infrastructure::config::load_api_config;
use utility_services::infrastructure::logging::init_tracing;
use utility_services::infrastructure::server::serve;
use utility_services::infrastructure::tagger_store::prepare_tagger;
use utility_services::presentation::app_state::ApiState;
use utility_services::presentation::routes::api_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_api_config()?;

    // Training is CPU bound; keep it off the async workers
    let tagger_settings = config.tagger.clone();
    let tagger = tokio::task::spawn_blocking(move || prepare_tagger(&tagger_settings)).await??;

    let text_service = TextAnalysisService::new(
        WordTokenizer::new(config.tagger.keep_punctuation),
        Arc::new(tagger),
    );
    let router = api_router(ApiState::with_text_analysis(text_service));

    serve(router, &config.server, "text analysis service").await
}
