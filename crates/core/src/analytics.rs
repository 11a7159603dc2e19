//! Aggregations behind the map, area and dashboard analytics views.
//!
//! Input is a flat list of [`IssueSample`]s fetched by the caller; everything
//! here is in-memory grouping so it can be tested without a database.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::issue::{IssueStatus, IssueType};
use crate::types::Timestamp;

/// The fields of an issue the analytics need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueSample {
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub created_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl IssueSample {
    /// Hours from creation to the first resolution, if ever resolved.
    pub fn resolution_hours(&self) -> Option<f64> {
        self.closed_at
            .map(|closed| (closed - self.created_at).num_milliseconds() as f64 / 3_600_000.0)
    }
}

/// Mean of the samples' resolution times, `0.0` when none were resolved.
fn mean_resolution_hours<'a>(samples: impl IntoIterator<Item = &'a IssueSample>) -> f64 {
    let (sum, n) = samples
        .into_iter()
        .filter_map(IssueSample::resolution_hours)
        .fold((0.0, 0u32), |(sum, n), h| (sum + h, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

// ---------------------------------------------------------------------------
// Area analytics
// ---------------------------------------------------------------------------

/// Per-category figures inside a radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub count: i64,
    pub avg_resolution_hours: f64,
}

/// Group samples by issue type with counts and mean resolution time.
pub fn area_breakdown(samples: &[IssueSample]) -> BTreeMap<&'static str, CategoryStats> {
    let mut groups: BTreeMap<&'static str, Vec<&IssueSample>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry(sample.issue_type.as_str())
            .or_default()
            .push(sample);
    }
    groups
        .into_iter()
        .map(|(issue_type, group)| {
            let stats = CategoryStats {
                count: group.len() as i64,
                avg_resolution_hours: mean_resolution_hours(group.iter().copied()),
            };
            (issue_type, stats)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard overview
// ---------------------------------------------------------------------------

/// Time bucket width for the issues-over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Interval::Day),
            "week" => Ok(Interval::Week),
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(CoreError::Validation(format!(
                "Invalid interval '{other}'. Must be one of: day, week, month, year"
            ))),
        }
    }
}

impl Interval {
    /// Sortable bucket key for a timestamp.
    ///
    /// Weeks start on Sunday and are keyed by that Sunday's date.
    pub fn bucket(self, ts: Timestamp) -> String {
        let date = ts.date_naive();
        match self {
            Interval::Day => date.format("%Y-%m-%d").to_string(),
            Interval::Week => {
                let back = i64::from(date.weekday().num_days_from_sunday());
                (date - Duration::days(back)).format("%Y-%m-%d").to_string()
            }
            Interval::Month => date.format("%Y-%m").to_string(),
            Interval::Year => date.format("%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub bucket: String,
    pub count: i64,
}

/// Headline figures for the analytics dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub by_status: BTreeMap<&'static str, i64>,
    pub by_type: BTreeMap<&'static str, i64>,
    pub by_department: BTreeMap<&'static str, i64>,
    pub avg_resolution_hours: f64,
    pub series: Vec<SeriesPoint>,
}

/// Compute the dashboard overview for a set of samples.
pub fn overview(samples: &[IssueSample], interval: Interval) -> Overview {
    let mut by_status: BTreeMap<&'static str, i64> = BTreeMap::new();
    let mut by_type: BTreeMap<&'static str, i64> = BTreeMap::new();
    let mut by_department: BTreeMap<&'static str, i64> = BTreeMap::new();
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();

    for sample in samples {
        *by_status.entry(sample.status.as_str()).or_default() += 1;
        *by_type.entry(sample.issue_type.as_str()).or_default() += 1;
        *by_department
            .entry(sample.issue_type.department().as_str())
            .or_default() += 1;
        *buckets.entry(interval.bucket(sample.created_at)).or_default() += 1;
    }

    let count = |status: IssueStatus| by_status.get(status.as_str()).copied().unwrap_or(0);

    Overview {
        total: samples.len() as i64,
        open: count(IssueStatus::Open),
        in_progress: count(IssueStatus::InProgress),
        resolved: count(IssueStatus::Resolved),
        avg_resolution_hours: mean_resolution_hours(samples),
        series: buckets
            .into_iter()
            .map(|(bucket, count)| SeriesPoint { bucket, count })
            .collect(),
        by_status,
        by_type,
        by_department,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample(
        issue_type: IssueType,
        status: IssueStatus,
        created_at: Timestamp,
        closed_at: Option<Timestamp>,
    ) -> IssueSample {
        IssueSample {
            issue_type,
            status,
            created_at,
            closed_at,
        }
    }

    #[test]
    fn area_breakdown_averages_only_resolved() {
        let samples = [
            sample(IssueType::Potholes, IssueStatus::Resolved, at(2026, 1, 1, 0), Some(at(2026, 1, 1, 10))),
            sample(IssueType::Potholes, IssueStatus::Resolved, at(2026, 1, 2, 0), Some(at(2026, 1, 2, 20))),
            sample(IssueType::Potholes, IssueStatus::Open, at(2026, 1, 3, 0), None),
            sample(IssueType::Garbage, IssueStatus::Open, at(2026, 1, 3, 0), None),
        ];
        let breakdown = area_breakdown(&samples);

        assert_eq!(breakdown["potholes"].count, 3);
        assert!((breakdown["potholes"].avg_resolution_hours - 15.0).abs() < 1e-9);
        assert_eq!(breakdown["garbage"].count, 1);
        assert_eq!(breakdown["garbage"].avg_resolution_hours, 0.0);
    }

    #[test]
    fn area_breakdown_of_nothing_is_empty() {
        assert!(area_breakdown(&[]).is_empty());
    }

    #[test]
    fn interval_buckets() {
        // 2026-10-16 is a Friday; its week starts on Sunday 2026-10-11.
        let ts = at(2026, 10, 16, 9);
        assert_eq!(Interval::Day.bucket(ts), "2026-10-16");
        assert_eq!(Interval::Week.bucket(ts), "2026-10-11");
        assert_eq!(Interval::Month.bucket(ts), "2026-10");
        assert_eq!(Interval::Year.bucket(ts), "2026");
    }

    #[test]
    fn interval_parses_known_names_only() {
        assert_eq!("month".parse::<Interval>().unwrap(), Interval::Month);
        assert!("quarter".parse::<Interval>().is_err());
    }

    #[test]
    fn overview_counts_and_series() {
        let samples = [
            sample(IssueType::Potholes, IssueStatus::Open, at(2026, 3, 1, 0), None),
            sample(IssueType::LeakyPipes, IssueStatus::InProgress, at(2026, 3, 1, 5), None),
            sample(IssueType::Garbage, IssueStatus::Resolved, at(2026, 4, 2, 0), Some(at(2026, 4, 2, 6))),
        ];
        let o = overview(&samples, Interval::Month);

        assert_eq!(o.total, 3);
        assert_eq!(o.open, 1);
        assert_eq!(o.in_progress, 1);
        assert_eq!(o.resolved, 1);
        assert_eq!(o.by_department["DEPT_PWD"], 1);
        assert_eq!(o.by_department["DEPT_WATER"], 1);
        assert_eq!(o.by_department["DEPT_ENV"], 1);
        assert!((o.avg_resolution_hours - 6.0).abs() < 1e-9);
        assert_eq!(
            o.series,
            vec![
                SeriesPoint { bucket: "2026-03".into(), count: 2 },
                SeriesPoint { bucket: "2026-04".into(), count: 1 },
            ]
        );
    }
}
