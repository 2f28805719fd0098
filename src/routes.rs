use axum::{
    extract::{ConnectInfo, OriginalUri, Query, Request, State},
    http::{HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::{
    cache::{key_for_request, RequestDescriptor, ResponseCache},
    error::ApiError,
    utils::{ErrorResponse, RateLimiter},
    validate,
    weather::{self, normalize::NormalizedWeather, openweather::OpenWeatherClient},
};

pub const REFRESH_HEADER: &str = "x-refresh";
const CITY_KEY_FIELDS: &[&str] = &["city"];
const COORDS_KEY_FIELDS: &[&str] = &["lat", "lon"];

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub weather_client: Arc<OpenWeatherClient>,
    pub cache: ResponseCache,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub started_at: Instant,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub uptime: f64,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse<'a> {
    pub success: bool,
    pub data: &'a NormalizedWeather,
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

pub async fn get_weather_by_city(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(mut query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let city = validate::city_query(&query)?;
    // Key on the trimmed name so " Paris" and "Paris" share an entry
    query.insert("city".to_string(), city.clone());

    let key = cache_key(&uri, &query, CITY_KEY_FIELDS);
    let body = state
        .cache
        .get_or_fetch(&key, refresh_requested(&headers), || async {
            let weather = weather::fetch_by_city(&state.weather_client, &city).await?;
            success_body(&weather)
        })
        .await?;

    Ok(Json(body))
}

pub async fn get_weather_by_coords(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let (lat, lon) = validate::coords_query(&query)?;

    let key = cache_key(&uri, &query, COORDS_KEY_FIELDS);
    let body = state
        .cache
        .get_or_fetch(&key, refresh_requested(&headers), || async {
            let weather = weather::fetch_by_coords(&state.weather_client, lat, lon).await?;
            success_body(&weather)
        })
        .await?;

    Ok(Json(body))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Route not found")))
}

/// Fixed-window per-client limiter; clients are keyed by peer IP.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let allowed = state.rate_limiter.lock().await.check_rate_limit(&client);
    if !allowed {
        tracing::warn!("Rate limit exceeded for {}", client);
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}

pub fn refresh_requested(headers: &HeaderMap) -> bool {
    headers
        .get(REFRESH_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "true")
}

fn cache_key(uri: &Uri, query: &HashMap<String, String>, fields: &[&str]) -> String {
    let original_url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    key_for_request(
        &RequestDescriptor {
            method: "GET",
            path: uri.path(),
            original_url,
            query,
        },
        Some(fields),
    )
}

fn success_body(weather: &NormalizedWeather) -> Result<Value, ApiError> {
    serde_json::to_value(WeatherResponse {
        success: true,
        data: weather,
    })
    .map_err(|e| ApiError::Internal(format!("Failed to serialize weather: {}", e)))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/weather", get(get_weather_by_city))
        .route("/api/weather/coords", get(get_weather_by_coords))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}
