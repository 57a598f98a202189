// Image conversion service entry point
use utility_services::infrastructure::config::load_api_config;
use utility_services::infrastructure::logging::init_tracing;
use utility_services::infrastructure::server::serve;
use utility_services::presentation::app_state::ApiState;
use utility_services::presentation::routes::api_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_api_config()?;
    let router = api_router(ApiState::conversion_only());

    serve(router, &config.server, "image conversion service").await
}
