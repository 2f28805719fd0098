use super::daily::{group_daily, DailySummary, DEFAULT_ICON};
use super::types::{CurrentResponse, ForecastResponse, ForecastStep, Place};
use crate::utils::{local_from_epoch, ms_to_kph, round_to_decimals, to_iso_string, wind_direction};
use serde::{Deserialize, Serialize};

pub const HOURLY_STEPS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeather {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub timezone_offset_sec: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temp_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub clouds: Option<f64>,
    pub wind_kph: f64,
    pub wind_dir: Option<String>,
    pub visibility_km: Option<f64>,
    pub condition: Condition,
    /// Location-local wall time serialized with a `Z` suffix.
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub code: Option<i64>,
    pub text: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    #[serde(rename = "timeISO")]
    pub time_iso: Option<String>,
    pub temp_c: Option<f64>,
    pub wind_kph: f64,
    pub wind_dir: Option<String>,
    pub condition_text: String,
    pub icon: String,
}

/// Combine geocoding, current and forecast payloads into the public shape.
///
/// Missing upstream fields degrade to `None`, `0` or empty strings; this never
/// fails on incomplete data.
pub fn normalize(current: &CurrentResponse, forecast: &ForecastResponse, place: &Place) -> NormalizedWeather {
    let offset = timezone_offset(current, forecast);

    let main = current.main.clone().unwrap_or_default();
    let wind = current.wind.clone().unwrap_or_default();
    let sys = current.sys.clone().unwrap_or_default();
    let condition = current.condition();

    let current_block = CurrentConditions {
        temp_c: main.temp,
        feels_like_c: main.feels_like,
        pressure: main.pressure,
        humidity: main.humidity,
        clouds: current.clouds.as_ref().and_then(|c| c.all),
        wind_kph: wind_kph(wind.speed),
        wind_dir: wind_direction(wind.deg).map(str::to_string),
        visibility_km: current
            .visibility
            .filter(|v| v.is_finite())
            .map(|meters| round_to_decimals(meters / 1000.0, 1)),
        condition: Condition {
            code: condition.and_then(|c| c.id),
            text: condition
                .and_then(|c| c.description.clone())
                .unwrap_or_default(),
            icon: condition
                .and_then(|c| c.icon.clone())
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
        },
        sunrise: local_iso(sys.sunrise, offset),
        sunset: local_iso(sys.sunset, offset),
    };

    let hourly = forecast
        .list
        .iter()
        .take(HOURLY_STEPS)
        .map(|step| hourly_entry(step, offset))
        .collect();

    NormalizedWeather {
        location: LocationInfo {
            name: place.name.clone(),
            country: place.country.clone(),
            state: place.state.clone(),
            lat: place.lat,
            lon: place.lon,
            timezone_offset_sec: offset,
        },
        current: current_block,
        hourly,
        daily: group_daily(&forecast.list, offset),
    }
}

/// Forecast offset first, then the current-conditions offset, then UTC.
pub fn timezone_offset(current: &CurrentResponse, forecast: &ForecastResponse) -> i64 {
    forecast
        .city
        .as_ref()
        .and_then(|city| city.timezone)
        .or(current.timezone)
        .unwrap_or(0)
}

fn hourly_entry(step: &ForecastStep, offset: i64) -> HourlyEntry {
    let wind = step.wind.clone().unwrap_or_default();

    HourlyEntry {
        time_iso: local_from_epoch(step.dt, offset).map(to_iso_string),
        temp_c: step.main.as_ref().and_then(|m| m.temp),
        wind_kph: wind_kph(wind.speed),
        wind_dir: wind_direction(wind.deg).map(str::to_string),
        condition_text: step.description().unwrap_or_default().to_string(),
        icon: step.icon().unwrap_or(DEFAULT_ICON).to_string(),
    }
}

fn wind_kph(speed_ms: Option<f64>) -> f64 {
    let kph = round_to_decimals(ms_to_kph(speed_ms), 1);
    if kph > 0.0 {
        kph
    } else {
        0.0
    }
}

// Epoch 0 is treated the same as an absent value.
fn local_iso(epoch_secs: Option<i64>, offset: i64) -> Option<String> {
    epoch_secs
        .filter(|secs| *secs != 0)
        .and_then(|secs| local_from_epoch(secs, offset))
        .map(to_iso_string)
}
