//! Upstream payload models.
//!
//! Every field the pipeline reads is declared optional with a serde default, so
//! an incomplete payload still deserializes and the normalizer decides what a
//! missing value becomes.

use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_NAME: &str = "Selected location";

/// A resolved place for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// Placeholder for a caller-supplied coordinate pair.
    pub fn at_coordinates(lat: f64, lon: f64) -> Self {
        Self {
            name: PLACEHOLDER_NAME.to_string(),
            country: None,
            state: None,
            lat,
            lon,
        }
    }

    /// Fill name and country from forecast city metadata when the forecast has it.
    pub fn backfilled_from(mut self, city: Option<&ForecastCity>) -> Self {
        if let Some(city) = city {
            if let Some(name) = city.name.as_deref().filter(|n| !n.is_empty()) {
                self.name = name.to_string();
            }
            self.country = city.country.clone().filter(|c| !c.is_empty());
        }
        self
    }
}

impl From<GeocodeResponse> for Place {
    fn from(geo: GeocodeResponse) -> Self {
        Self {
            name: geo.name,
            country: geo.country,
            state: geo.state.filter(|s| !s.is_empty()),
            lat: geo.lat,
            lon: geo.lon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MainBlock {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub deg: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clouds {
    #[serde(default)]
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// `/data/2.5/weather` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `/data/2.5/forecast` payload: a flat chronological list of 3-hour steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastStep>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastStep {
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

impl MainBlock {
    pub fn low(&self) -> Option<f64> {
        self.temp_min.or(self.temp).filter(|t| t.is_finite())
    }

    pub fn high(&self) -> Option<f64> {
        self.temp_max.or(self.temp).filter(|t| t.is_finite())
    }
}

impl CurrentResponse {
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }
}

impl ForecastStep {
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }

    pub fn icon(&self) -> Option<&str> {
        self.condition()
            .and_then(|c| c.icon.as_deref())
            .filter(|icon| !icon.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.condition().and_then(|c| c.description.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_forecast_step_deserializes() {
        let step: ForecastStep = serde_json::from_str(r#"{"dt": 1700000000}"#).unwrap();
        assert_eq!(step.dt, 1_700_000_000);
        assert!(step.main.is_none());
        assert!(step.icon().is_none());
        assert!(step.description().is_none());
    }

    #[test]
    fn test_low_high_fall_back_to_point_temperature() {
        let main = MainBlock {
            temp: Some(10.0),
            temp_max: Some(12.0),
            ..Default::default()
        };
        assert_eq!(main.low(), Some(10.0));
        assert_eq!(main.high(), Some(12.0));
        assert_eq!(MainBlock::default().low(), None);
    }

    #[test]
    fn test_placeholder_backfill() {
        let place = Place::at_coordinates(1.0, 2.0).backfilled_from(None);
        assert_eq!(place.name, PLACEHOLDER_NAME);
        assert_eq!(place.country, None);

        let city = ForecastCity {
            name: Some("Lyon".to_string()),
            country: Some("FR".to_string()),
            ..Default::default()
        };
        let place = Place::at_coordinates(45.76, 4.84).backfilled_from(Some(&city));
        assert_eq!(place.name, "Lyon");
        assert_eq!(place.country.as_deref(), Some("FR"));

        let unnamed = ForecastCity::default();
        let place = Place::at_coordinates(0.0, 0.0).backfilled_from(Some(&unnamed));
        assert_eq!(place.name, PLACEHOLDER_NAME);
    }
}
