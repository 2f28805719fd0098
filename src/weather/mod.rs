pub mod daily;
pub mod normalize;
pub mod openweather;
pub mod types;

#[cfg(test)]
pub mod fixtures;

use normalize::{normalize, NormalizedWeather};
use openweather::{OpenWeatherClient, OpenWeatherError};
use types::Place;

/// Geocode `city`, then fetch and normalize its weather.
pub async fn fetch_by_city(
    client: &OpenWeatherClient,
    city: &str,
) -> Result<NormalizedWeather, OpenWeatherError> {
    let place = client.geocode(city).await?;
    let (current, forecast) = tokio::try_join!(
        client.get_current(place.lat, place.lon),
        client.get_forecast(place.lat, place.lon),
    )?;

    Ok(normalize(&current, &forecast, &place))
}

/// Fetch weather for raw coordinates. The place name starts as a placeholder
/// and is backfilled from the forecast's city metadata when present.
pub async fn fetch_by_coords(
    client: &OpenWeatherClient,
    lat: f64,
    lon: f64,
) -> Result<NormalizedWeather, OpenWeatherError> {
    let (current, forecast) = tokio::try_join!(
        client.get_current(lat, lon),
        client.get_forecast(lat, lon),
    )?;

    let place = Place::at_coordinates(lat, lon).backfilled_from(forecast.city.as_ref());
    Ok(normalize(&current, &forecast, &place))
}
