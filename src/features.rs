//! Feature engineering
//!
//! This module turns a raw daily-metrics table into an enriched table with
//! rolling baselines, z-scores, and derived indices. Rolling statistics use a
//! trailing window so a value at position i only depends on positions <= i,
//! which keeps scoring causal when a historical day is scored for training.

use crate::types::{DailyMetricsRow, EngineeredRow, RollingStats};
use std::collections::VecDeque;

/// Rolling window length in samples
pub const ROLLING_WINDOW: usize = 7;

/// Minimum samples in the window before rolling stats are defined
pub const MIN_WINDOW_SAMPLES: usize = 3;

/// Guard against division by zero when std7 collapses to 0
pub const Z_EPSILON: f64 = 1e-6;

/// Reference nightly sleep for sleep-debt computation (hours)
pub const SLEEP_REFERENCE_HOURS: f64 = 7.5;

/// Feature engineer for enriching raw metrics tables
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Compute the engineered table from a raw table.
    ///
    /// The input need not be sorted; output is ascending by date. An empty
    /// input yields an empty output. The transform is pure and deterministic.
    pub fn compute(table: &[DailyMetricsRow]) -> Vec<EngineeredRow> {
        if table.is_empty() {
            return Vec::new();
        }

        let mut rows: Vec<DailyMetricsRow> = table.to_vec();
        rows.sort_by_key(|r| r.date);

        // Each signal's rolling stats are computed independently
        let sleep_stats = rolling_column(&rows, |r| r.sleep_hours);
        let rhr_stats = rolling_column(&rows, |r| r.resting_hr_bpm);
        let hrv_stats = rolling_column(&rows, |r| r.hrv_rmssd_ms);
        let steps_stats = rolling_column(&rows, |r| r.steps);
        let sentiment_stats = rolling_column(&rows, |r| r.sentiment);
        let meeting_stats = rolling_column(&rows, |r| r.meeting_minutes);

        rows.into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let sleep_debt = compute_sleep_debt(&raw);
                let workload_index = compute_workload_index(&raw);
                EngineeredRow {
                    raw,
                    sleep_hours_stats: sleep_stats[i],
                    resting_hr_bpm_stats: rhr_stats[i],
                    hrv_rmssd_ms_stats: hrv_stats[i],
                    steps_stats: steps_stats[i],
                    sentiment_stats: sentiment_stats[i],
                    meeting_minutes_stats: meeting_stats[i],
                    sleep_debt,
                    workload_index,
                }
            })
            .collect()
    }
}

/// Sleep debt: shortfall below the reference, floored at 0.
/// Missing sleep data reads as the reference itself (no debt).
fn compute_sleep_debt(row: &DailyMetricsRow) -> f64 {
    let sleep = row.sleep_hours.unwrap_or(SLEEP_REFERENCE_HOURS);
    (SLEEP_REFERENCE_HOURS - sleep).max(0.0)
}

/// Workload index: meeting hours plus half a point per after-hours meeting.
/// A precomputed value on the raw row wins.
fn compute_workload_index(row: &DailyMetricsRow) -> f64 {
    if let Some(idx) = row.workload_index {
        return idx;
    }
    let meeting_minutes = row.meeting_minutes.unwrap_or(0.0);
    let after_hours = row.after_hours_meetings.unwrap_or(0.0);
    meeting_minutes / 60.0 + 0.5 * after_hours
}

/// Compute trailing rolling stats for one signal column.
///
/// The window spans the last [`ROLLING_WINDOW`] rows; only present values in
/// the window count toward the minimum. Stats are defined for a row when the
/// row itself has a value and the window holds at least
/// [`MIN_WINDOW_SAMPLES`] values.
fn rolling_column<F>(rows: &[DailyMetricsRow], get: F) -> Vec<Option<RollingStats>>
where
    F: Fn(&DailyMetricsRow) -> Option<f64>,
{
    let mut window: VecDeque<Option<f64>> = VecDeque::with_capacity(ROLLING_WINDOW);
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let value = get(row);
        window.push_back(value);
        while window.len() > ROLLING_WINDOW {
            window.pop_front();
        }

        let samples: Vec<f64> = window.iter().filter_map(|v| *v).collect();
        let stats = match value {
            Some(v) if samples.len() >= MIN_WINDOW_SAMPLES => {
                let mean7 = samples.iter().sum::<f64>() / samples.len() as f64;
                let var = samples
                    .iter()
                    .map(|x| (x - mean7) * (x - mean7))
                    .sum::<f64>()
                    / (samples.len() - 1) as f64;
                let std7 = var.sqrt();
                let z = (v - mean7) / (std7 + Z_EPSILON);
                Some(RollingStats { mean7, std7, z })
            }
            _ => None,
        };
        out.push(stats);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn make_row(day: u32, sleep: f64, rhr: f64) -> DailyMetricsRow {
        DailyMetricsRow {
            sleep_hours: Some(sleep),
            resting_hr_bpm: Some(rhr),
            ..DailyMetricsRow::new(date(day))
        }
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(FeatureEngineer::compute(&[]), Vec::new());
    }

    #[test]
    fn test_sorts_by_date() {
        let table = vec![make_row(3, 7.0, 58.0), make_row(1, 6.0, 60.0), make_row(2, 8.0, 55.0)];
        let engineered = FeatureEngineer::compute(&table);

        let dates: Vec<NaiveDate> = engineered.iter().map(|r| r.raw.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
    }

    #[test]
    fn test_rolling_stats_need_minimum_window() {
        let table: Vec<DailyMetricsRow> =
            (1..=5).map(|d| make_row(d, 6.0 + d as f64 * 0.1, 58.0)).collect();
        let engineered = FeatureEngineer::compute(&table);

        // First two rows are below the 3-sample minimum
        assert!(engineered[0].sleep_hours_stats.is_none());
        assert!(engineered[1].sleep_hours_stats.is_none());
        assert!(engineered[2].sleep_hours_stats.is_some());
        assert!(engineered[4].sleep_hours_stats.is_some());
    }

    #[test]
    fn test_rolling_mean_trailing_window() {
        // 10 days of sleep 6.0 then a jump to 9.0 on the last day
        let mut table: Vec<DailyMetricsRow> = (1..=9).map(|d| make_row(d, 6.0, 58.0)).collect();
        table.push(make_row(10, 9.0, 58.0));
        let engineered = FeatureEngineer::compute(&table);

        let stats = engineered[9].sleep_hours_stats.unwrap();
        // Window is the trailing 7 values: six 6.0s and one 9.0
        let expected_mean = (6.0 * 6.0 + 9.0) / 7.0;
        assert!((stats.mean7 - expected_mean).abs() < 1e-9);
        assert!(stats.z > 0.0);

        // Earlier rows never see the future jump
        let stats_day9 = engineered[8].sleep_hours_stats.unwrap();
        assert!((stats_day9.mean7 - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_std_is_guarded() {
        // Constant signal: std7 = 0, z must stay finite via the epsilon guard
        let table: Vec<DailyMetricsRow> = (1..=7).map(|d| make_row(d, 6.0, 58.0)).collect();
        let engineered = FeatureEngineer::compute(&table);

        let stats = engineered[6].sleep_hours_stats.unwrap();
        assert_eq!(stats.std7, 0.0);
        assert!(stats.z.is_finite());
        assert!((stats.z).abs() < 1e-3); // (6.0 - 6.0) / eps = 0
    }

    #[test]
    fn test_missing_values_skipped_in_window() {
        let mut table: Vec<DailyMetricsRow> = (1..=6).map(|d| make_row(d, 6.0, 58.0)).collect();
        table[2].sleep_hours = None;
        let engineered = FeatureEngineer::compute(&table);

        // Row with a missing value has no stats for that signal
        assert!(engineered[2].sleep_hours_stats.is_none());
        // But the other signal is unaffected
        assert!(engineered[2].resting_hr_bpm_stats.is_some());
        // Later rows still reach the minimum with the gap skipped
        assert!(engineered[5].sleep_hours_stats.is_some());
    }

    #[test]
    fn test_sleep_debt() {
        let mut row = make_row(1, 6.0, 58.0);
        let engineered = FeatureEngineer::compute(&[row.clone()]);
        assert!((engineered[0].sleep_debt - 1.5).abs() < 1e-9);

        // Oversleeping floors at zero
        row.sleep_hours = Some(9.0);
        let engineered = FeatureEngineer::compute(&[row.clone()]);
        assert_eq!(engineered[0].sleep_debt, 0.0);

        // Missing sleep reads as the reference: no debt
        row.sleep_hours = None;
        let engineered = FeatureEngineer::compute(&[row]);
        assert_eq!(engineered[0].sleep_debt, 0.0);
    }

    #[test]
    fn test_workload_index_derived_and_preserved() {
        let mut row = DailyMetricsRow::new(date(1));
        row.meeting_minutes = Some(360.0);
        row.after_hours_meetings = Some(2.0);
        let engineered = FeatureEngineer::compute(&[row.clone()]);
        assert!((engineered[0].workload_index - 7.0).abs() < 1e-9);

        // A precomputed index is preserved, not recomputed
        row.workload_index = Some(3.25);
        let engineered = FeatureEngineer::compute(&[row]);
        assert_eq!(engineered[0].workload_index, 3.25);
    }

    #[test]
    fn test_deterministic() {
        let table: Vec<DailyMetricsRow> =
            (1..=14).map(|d| make_row(d, 5.0 + (d % 3) as f64, 55.0 + d as f64)).collect();
        let a = FeatureEngineer::compute(&table);
        let b = FeatureEngineer::compute(&table);
        assert_eq!(a, b);
    }
}
