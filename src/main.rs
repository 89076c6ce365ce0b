use itinerary::config::AppConfig;
use itinerary::error::AppError;
use itinerary::repository;
use itinerary::routes::create_router;
use itinerary::services::itinerary::ItineraryService;
use itinerary::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    info!("using storage backend {:?}", config.storage);

    let repo = repository::connect(&config.storage).await?;
    let itinerary = ItineraryService::load(repo, config.seed_catalog).await?;

    let state = AppState::new(itinerary);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,itinerary=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
