use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Map a wind bearing in degrees onto a 16-point compass label.
///
/// Sectors are 22.5° wide and sector 0 ("N") is centered on 0°. Returns `None`
/// for missing or non-finite bearings.
pub fn wind_direction(bearing: Option<f64>) -> Option<&'static str> {
    let bearing = bearing.filter(|b| b.is_finite())?;
    let sector = (bearing.rem_euclid(360.0) / 22.5).round() as usize % COMPASS_POINTS.len();
    Some(COMPASS_POINTS[sector])
}

/// Convert m/s to km/h. Missing or non-finite speeds count as 0.
pub fn ms_to_kph(speed: Option<f64>) -> f64 {
    speed.filter(|v| v.is_finite()).unwrap_or(0.0) * 3.6
}

/// Shift an instant forward by a UTC offset.
///
/// The result's UTC calendar fields equal the local wall-clock fields of
/// `instant` at `offset_secs`, so formatting it as UTC yields a local-looking
/// timestamp.
pub fn shift_to_local(instant: DateTime<Utc>, offset_secs: i64) -> Option<DateTime<Utc>> {
    instant.checked_add_signed(Duration::try_seconds(offset_secs)?)
}

/// Epoch seconds to a location-local shifted instant.
pub fn local_from_epoch(epoch_secs: i64, offset_secs: i64) -> Option<DateTime<Utc>> {
    shift_to_local(DateTime::from_timestamp(epoch_secs, 0)?, offset_secs)
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso_string(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Round to specified decimal places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let multiplier = 10_f64.powi(decimals as i32);
    (value * multiplier).round() / multiplier
}

/// Round to the nearest integer with halves going toward +∞ (-2.5 -> -2).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Fixed-window request counter keyed by client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    requests: HashMap<String, Vec<DateTime<Utc>>>,
    max_requests: usize,
    window_duration: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_duration: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests,
            window_duration,
        }
    }

    pub fn check_rate_limit(&mut self, key: &str) -> bool {
        self.check_rate_limit_at(key, Utc::now())
    }

    fn check_rate_limit_at(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.window_duration;

        let requests = self.requests.entry(key.to_string()).or_default();
        requests.retain(|&timestamp| timestamp > cutoff);

        if requests.len() < self.max_requests {
            requests.push(now);
            true
        } else {
            false
        }
    }

    pub fn cleanup_old_entries(&mut self) {
        let cutoff = Utc::now() - self.window_duration;

        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| timestamp > cutoff);
            !timestamps.is_empty()
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }
}

/// Error body shared by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wind_direction_cardinals() {
        assert_eq!(wind_direction(Some(0.0)), Some("N"));
        assert_eq!(wind_direction(Some(90.0)), Some("E"));
        assert_eq!(wind_direction(Some(180.0)), Some("S"));
        assert_eq!(wind_direction(Some(270.0)), Some("W"));
        assert_eq!(wind_direction(Some(22.5)), Some("NNE"));
        assert_eq!(wind_direction(Some(350.0)), Some("N"));
        assert_eq!(wind_direction(Some(-90.0)), Some("W"));
    }

    #[test]
    fn test_wind_direction_fails_soft() {
        assert_eq!(wind_direction(None), None);
        assert_eq!(wind_direction(Some(f64::NAN)), None);
        assert_eq!(wind_direction(Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_wind_direction_is_periodic() {
        for bearing in 0..360 {
            let bearing = bearing as f64;
            let expected = wind_direction(Some(bearing));
            for k in -3..=3 {
                assert_eq!(
                    wind_direction(Some(bearing + 360.0 * k as f64)),
                    expected,
                    "bearing {} shifted by {} turns",
                    bearing,
                    k
                );
            }
        }
    }

    #[test]
    fn test_ms_to_kph() {
        assert_eq!(ms_to_kph(Some(0.0)), 0.0);
        assert_eq!(ms_to_kph(None), 0.0);
        assert_eq!(ms_to_kph(Some(f64::NAN)), 0.0);
        assert!((ms_to_kph(Some(10.0)) - 36.0).abs() < 1e-9);
        for v in [0.1, 1.0, 5.5, 42.0] {
            assert!(ms_to_kph(Some(v)) >= v);
        }
    }

    #[test]
    fn test_shift_to_local_moves_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 22, 30, 0).unwrap();
        let shifted = shift_to_local(instant, 5 * 3600 + 1800).unwrap();
        assert_eq!(to_iso_string(shifted), "2024-05-02T04:00:00.000Z");

        let west = shift_to_local(instant, -8 * 3600).unwrap();
        assert_eq!(to_iso_string(west), "2024-05-01T14:30:00.000Z");
    }

    #[test]
    fn test_local_from_epoch() {
        let local = local_from_epoch(0, 3600).unwrap();
        assert_eq!(to_iso_string(local), "1970-01-01T01:00:00.000Z");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to_decimals(12.345, 1), 12.3);
        assert_eq!(round_to_decimals(12.35, 0), 12.0);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn test_rate_limiter() {
        let mut limiter = RateLimiter::new(2, Duration::seconds(60));
        let now = Utc::now();

        assert!(limiter.check_rate_limit_at("10.0.0.1", now));
        assert!(limiter.check_rate_limit_at("10.0.0.1", now));
        assert!(!limiter.check_rate_limit_at("10.0.0.1", now));

        assert!(limiter.check_rate_limit_at("10.0.0.2", now));

        // Window rolls over
        assert!(limiter.check_rate_limit_at("10.0.0.1", now + Duration::seconds(61)));
    }

    #[test]
    fn test_cleanup_old_entries() {
        let mut limiter = RateLimiter::new(5, Duration::seconds(60));
        limiter.check_rate_limit_at("stale", Utc::now() - Duration::seconds(120));
        limiter.check_rate_limit("fresh");

        limiter.cleanup_old_entries();

        assert_eq!(limiter.tracked_clients(), 1);
    }
}
