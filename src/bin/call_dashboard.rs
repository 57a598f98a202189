// Call dashboard entry point - Load the feed once, then serve the page
use utility_services::application::dashboard_service::CallDashboardService;
use utility_services::infrastructure::config::load_dashboard_config;
use utility_services::infrastructure::logging::init_tracing;
use utility_services::infrastructure::open_data_feed::feed_from_settings;
use utility_services::infrastructure::server::serve;
use utility_services::presentation::app_state::DashboardState;
use utility_services::presentation::routes::dashboard_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_dashboard_config()?;

    // A failed fetch aborts startup
    let feed = feed_from_settings(&config.feed);
    let dashboard_service = CallDashboardService::load(feed.as_ref(), config.table.page_size).await?;

    let router = dashboard_router(DashboardState { dashboard_service });

    serve(router, &config.server, "call dashboard").await
}
