use std::collections::HashMap;

use crate::error::ApiError;

/// `?city=` must be present and non-blank; returns it trimmed.
pub fn city_query(query: &HashMap<String, String>) -> Result<String, ApiError> {
    query
        .get("city")
        .map(|city| city.trim())
        .filter(|city| !city.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::InvalidInput("Query param ?city= is required".to_string()))
}

/// `?lat=&lon=` must both be finite numbers within coordinate range.
pub fn coords_query(query: &HashMap<String, String>) -> Result<(f64, f64), ApiError> {
    let (Some(lat), Some(lon)) = (number_param(query, "lat"), number_param(query, "lon")) else {
        return Err(ApiError::InvalidInput(
            "Query params lat, lon must be valid numbers".to_string(),
        ));
    };

    validate_coordinates(lat, lon).map_err(ApiError::InvalidInput)?;
    Ok((lat, lon))
}

fn number_param(query: &HashMap<String, String>, name: &str) -> Option<f64> {
    query
        .get(name)
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_city_query() {
        assert_eq!(city_query(&query(&[("city", "  Paris ")])).unwrap(), "Paris");
        assert!(matches!(city_query(&query(&[("city", "   ")])), Err(ApiError::InvalidInput(_))));
        assert!(matches!(city_query(&query(&[])), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_coords_query() {
        assert_eq!(
            coords_query(&query(&[("lat", "48.85"), ("lon", " 2.35")])).unwrap(),
            (48.85, 2.35)
        );
        assert!(coords_query(&query(&[("lat", "48.85")])).is_err());
        assert!(coords_query(&query(&[("lat", "abc"), ("lon", "2")])).is_err());
        assert!(coords_query(&query(&[("lat", ""), ("lon", "2")])).is_err());
        assert!(coords_query(&query(&[("lat", "NaN"), ("lon", "2")])).is_err());
        assert!(coords_query(&query(&[("lat", "inf"), ("lon", "2")])).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
    }
}
