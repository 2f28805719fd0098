use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_backend::cache::ResponseCache;
use weather_backend::config::Config;
use weather_backend::routes::{create_router, AppState};
use weather_backend::utils::RateLimiter;
use weather_backend::weather::openweather::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let weather_client = Arc::new(OpenWeatherClient::new(config.clone())?);

    let cache = ResponseCache::new(config.cache_ttl(), config.cache_max_entries);
    cache.spawn_sweeper(config.cache_sweep_interval());

    let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(
        config.rate_limit_per_min,
        chrono::Duration::seconds(60),
    )));
    spawn_rate_limit_cleanup(rate_limiter.clone());

    let state = AppState {
        weather_client,
        cache,
        rate_limiter,
        started_at: Instant::now(),
    };

    let app = create_router(state)
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server starting on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn spawn_rate_limit_cleanup(rate_limiter: Arc<Mutex<RateLimiter>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            rate_limiter.lock().await.cleanup_old_entries();
        }
    });
}
