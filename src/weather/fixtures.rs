//! Deterministic OpenWeather-shaped payloads for tests.

use serde_json::{json, Value};

/// 2024-05-01T00:00:00Z
pub const SERIES_START: i64 = 1_714_521_600;
pub const STEP_SECS: i64 = 3 * 3600;

pub fn geocode_json(name: &str, country: &str, lat: f64, lon: f64) -> Value {
    json!([{
        "name": name,
        "local_names": { "en": name },
        "lat": lat,
        "lon": lon,
        "country": country
    }])
}

pub fn current_json(temp: f64, timezone_offset: i64) -> Value {
    json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": {
            "temp": temp,
            "feels_like": temp - 1.0,
            "temp_min": temp - 2.0,
            "temp_max": temp + 2.0,
            "pressure": 1015,
            "humidity": 62
        },
        "visibility": 10000,
        "wind": { "speed": 3.6, "deg": 250 },
        "clouds": { "all": 0 },
        "dt": SERIES_START,
        "sys": { "country": "FR", "sunrise": SERIES_START + 4 * 3600, "sunset": SERIES_START + 19 * 3600 },
        "timezone": timezone_offset,
        "name": "Paris"
    })
}

/// `count` three-hour steps starting at [`SERIES_START`].
pub fn forecast_json(count: usize, timezone_offset: i64, city: Option<(&str, &str)>) -> Value {
    let list: Vec<Value> = (0..count)
        .map(|i| {
            let hours_ahead = i as f64 * 3.0;
            // Diurnal temperature variation
            let temp = 14.0 + 5.0 * (hours_ahead * 0.26).sin();
            let rainy = i % 8 == 4;

            json!({
                "dt": SERIES_START + i as i64 * STEP_SECS,
                "main": {
                    "temp": temp,
                    "feels_like": temp - 1.0,
                    "temp_min": temp - 0.5,
                    "temp_max": temp + 0.5,
                    "pressure": 1013,
                    "humidity": 70
                },
                "weather": [if rainy {
                    json!({ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" })
                } else {
                    json!({ "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" })
                }],
                "clouds": { "all": 40 },
                "wind": { "speed": 2.5 + (i % 3) as f64, "deg": (i * 45) % 360 },
                "visibility": 10000,
                "pop": if rainy { 0.6 } else { 0.1 },
                "dt_txt": ""
            })
        })
        .collect();

    let mut forecast = json!({
        "cod": "200",
        "message": 0,
        "cnt": count,
        "list": list
    });

    if let Some((name, country)) = city {
        forecast["city"] = json!({
            "id": 2988507,
            "name": name,
            "coord": { "lat": 48.85, "lon": 2.35 },
            "country": country,
            "timezone": timezone_offset,
            "sunrise": SERIES_START + 4 * 3600,
            "sunset": SERIES_START + 19 * 3600
        });
    }

    forecast
}
