use super::types::ForecastStep;
use crate::utils::{local_from_epoch, round_half_up};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_DAYS: usize = 5;
pub const DEFAULT_ICON: &str = "01d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub min_c: Option<i64>,
    pub max_c: Option<i64>,
    pub icon: String,
    pub condition_text: String,
}

struct DayBucket<'a> {
    min_c: f64,
    max_c: f64,
    // Insertion-ordered so that equally frequent icons resolve to the first seen.
    icon_counts: Vec<(&'a str, usize)>,
    sample: &'a ForecastStep,
    sample_distance: u32,
}

impl<'a> DayBucket<'a> {
    fn new(step: &'a ForecastStep, distance: u32) -> Self {
        Self {
            min_c: f64::INFINITY,
            max_c: f64::NEG_INFINITY,
            icon_counts: Vec::new(),
            sample: step,
            sample_distance: distance,
        }
    }

    fn add(&mut self, step: &'a ForecastStep, distance: u32) {
        if let Some(main) = &step.main {
            if let Some(low) = main.low() {
                self.min_c = self.min_c.min(low);
            }
            if let Some(high) = main.high() {
                self.max_c = self.max_c.max(high);
            }
        }

        let icon = step.icon().unwrap_or(DEFAULT_ICON);
        match self.icon_counts.iter_mut().find(|(seen, _)| *seen == icon) {
            Some((_, count)) => *count += 1,
            None => self.icon_counts.push((icon, 1)),
        }

        if distance < self.sample_distance {
            self.sample = step;
            self.sample_distance = distance;
        }
    }

    fn dominant_icon(&self) -> &'a str {
        let mut best: Option<(&'a str, usize)> = None;
        for &(icon, count) in &self.icon_counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((icon, count));
            }
        }
        best.map(|(icon, _)| icon).unwrap_or(DEFAULT_ICON)
    }

    fn into_summary(self, date_iso: String) -> DailySummary {
        let min_c = self.min_c.is_finite().then(|| round_half_up(self.min_c));
        let max_c = self.max_c.is_finite().then(|| round_half_up(self.max_c));

        DailySummary {
            date_iso,
            min_c,
            max_c,
            icon: self.dominant_icon().to_string(),
            condition_text: self.sample.description().unwrap_or_default().to_string(),
        }
    }
}

/// Collapse a 3-hour forecast series into per-day summaries.
///
/// Days are location-local calendar dates at `offset_secs`. One offset covers
/// the whole series, so a DST change inside the forecast window is not
/// reflected. The representative text comes from the step closest to local
/// noon (first step wins ties) and the icon is the most frequent one (first
/// seen wins ties). At most [`MAX_DAYS`] entries are returned, oldest first.
pub fn group_daily(steps: &[ForecastStep], offset_secs: i64) -> Vec<DailySummary> {
    let mut days: BTreeMap<String, DayBucket<'_>> = BTreeMap::new();

    for step in steps {
        let Some(local) = local_from_epoch(step.dt, offset_secs) else {
            tracing::debug!(dt = step.dt, "Skipping forecast step with unrepresentable timestamp");
            continue;
        };
        let date_key = local.format("%Y-%m-%d").to_string();
        let distance = (local.hour() as i32 - 12).unsigned_abs();

        days.entry(date_key)
            .or_insert_with(|| DayBucket::new(step, distance))
            .add(step, distance);
    }

    days.into_iter()
        .take(MAX_DAYS)
        .map(|(date_iso, bucket)| bucket.into_summary(date_iso))
        .collect()
}
