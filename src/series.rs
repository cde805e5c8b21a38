use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{OpenDiggerError, Result};

/// A calendar month as used by the OpenDigger API keys (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// The API key form, `YYYY-MM`.
    pub fn key(&self) -> String {
        self.0.format("%Y-%m").to_string()
    }

    /// The display form, `MM/YYYY`.
    pub fn label(&self) -> String {
        self.0.format("%m/%Y").to_string()
    }
}

impl FromStr for YearMonth {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !well_formed {
            return Err(OpenDiggerError::Format(s.to_string()));
        }

        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| OpenDiggerError::Format(s.to_string()))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point<V> {
    pub period: YearMonth,
    pub value: V,
}

impl<V> Point<V> {
    pub fn label(&self) -> String {
        self.period.label()
    }
}

/// A normalized flat series for one resource of one repository.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    pub repo_name: String,
    pub metric_name: String,
    pub points: Vec<Point<Value>>,
}

impl MetricSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Numeric values for charting, or `None` if any point is not a number.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        self.points.iter().map(|p| p.value.as_f64()).collect()
    }
}

/// Raw body of the response-time style resources
/// (`issue_response_time`, `change_request_resolution_duration`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponseTime {
    pub avg: IndexMap<String, f64>,
    pub levels: IndexMap<String, [f64; 4]>,
}

/// The structured variant: an average line plus four bucket counts per month.
#[derive(Debug, Clone)]
pub struct ResponseTimeSeries {
    pub repo_name: String,
    pub metric_name: String,
    pub avg: Vec<Point<f64>>,
    pub levels: Vec<Point<[f64; 4]>>,
}

impl ResponseTimeSeries {
    pub fn is_empty(&self) -> bool {
        self.avg.is_empty() && self.levels.is_empty()
    }

    /// Average and levels joined by month, in calendar order.
    pub fn rows(&self) -> Vec<(YearMonth, Option<f64>, Option<[f64; 4]>)> {
        let mut rows: BTreeMap<YearMonth, (Option<f64>, Option<[f64; 4]>)> = BTreeMap::new();
        for point in &self.avg {
            rows.entry(point.period).or_default().0 = Some(point.value);
        }
        for point in &self.levels {
            rows.entry(point.period).or_default().1 = Some(point.value);
        }
        rows.into_iter()
            .map(|(period, (avg, levels))| (period, avg, levels))
            .collect()
    }
}

/// Turns a raw `YYYY-MM` keyed mapping into a chronologically ordered series.
///
/// The most recent month is dropped because the upstream API publishes it while
/// it is still being filled in. This is a freshness heuristic: nothing in the
/// payload marks the entry as partial.
pub fn normalize<V>(raw: IndexMap<String, V>) -> Result<Vec<Point<V>>> {
    let mut points = raw
        .into_iter()
        .map(|(key, value)| {
            Ok(Point {
                period: key.parse()?,
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    points.sort_by_key(|p| p.period);
    points.dedup_by_key(|p| p.period);
    points.pop();

    Ok(points)
}

pub fn normalize_response_time(raw: RawResponseTime) -> Result<(Vec<Point<f64>>, Vec<Point<[f64; 4]>>)> {
    Ok((normalize(raw.avg)?, normalize(raw.levels)?))
}
