// Call record domain models - 311 call wait times from the open-data feed
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

pub const TIMESTAMP: &str = "timestamp";
pub const WAIT_TIME: &str = "wait_time_seconds";
pub const TALK_TIME: &str = "talk_time_seconds";

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed row {row} is not a JSON object")]
    NotAnObject { row: usize },
    #[error("feed row {row} has an unparseable timestamp: {value}")]
    InvalidTimestamp { row: usize, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub timestamp: NaiveDateTime,
    pub wait_time_seconds: f64,
    pub talk_time_seconds: f64,
    /// Remaining feed fields, in feed order
    pub extra: Map<String, Value>,
}

impl CallRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Row data for the table widget, one entry per column (null when absent)
    pub fn to_row(&self, columns: &[String]) -> Map<String, Value> {
        columns
            .iter()
            .map(|column| {
                let value = match column.as_str() {
                    TIMESTAMP => Value::String(format_timestamp(&self.timestamp)),
                    WAIT_TIME => number(self.wait_time_seconds),
                    TALK_TIME => number(self.talk_time_seconds),
                    other => self.extra.get(other).cloned().unwrap_or(Value::Null),
                };
                (column.clone(), value)
            })
            .collect()
    }
}

/// Closed interval of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.start <= date && date <= self.end
    }
}

/// In-memory call table, sorted by timestamp and immutable after load
#[derive(Debug, Clone, Default)]
pub struct CallTable {
    columns: Vec<String>,
    records: Vec<CallRecord>,
    dropped: usize,
}

impl CallTable {
    /// Build the table from raw feed rows.
    ///
    /// Wait and talk times are coerced to numbers; rows where either is not
    /// numeric, or where the timestamp is missing, are discarded. A timestamp
    /// that is present but cannot be parsed fails the whole load.
    pub fn from_feed(rows: Vec<Value>) -> Result<Self, FeedError> {
        let mut columns: Vec<String> = Vec::new();
        let mut records = Vec::with_capacity(rows.len());
        let mut dropped = 0;

        for (row, value) in rows.into_iter().enumerate() {
            let Value::Object(mut fields) = value else {
                return Err(FeedError::NotAnObject { row });
            };

            for key in fields.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }

            let timestamp = match fields.shift_remove(TIMESTAMP) {
                Some(Value::String(raw)) => Some(
                    parse_timestamp(&raw).ok_or(FeedError::InvalidTimestamp { row, value: raw })?,
                ),
                Some(Value::Null) | None => None,
                Some(other) => {
                    return Err(FeedError::InvalidTimestamp {
                        row,
                        value: other.to_string(),
                    });
                }
            };
            let wait = fields.shift_remove(WAIT_TIME).as_ref().and_then(coerce_number);
            let talk = fields.shift_remove(TALK_TIME).as_ref().and_then(coerce_number);

            match (timestamp, wait, talk) {
                (Some(timestamp), Some(wait_time_seconds), Some(talk_time_seconds)) => {
                    records.push(CallRecord {
                        timestamp,
                        wait_time_seconds,
                        talk_time_seconds,
                        extra: fields,
                    });
                }
                _ => dropped += 1,
            }
        }

        records.sort_by_key(|r| r.timestamp);

        Ok(Self {
            columns,
            records,
            dropped,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of feed rows discarded during load
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// First and last calendar dates present, if any
    pub fn date_bounds(&self) -> Option<DateRange> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some(DateRange::new(first.date(), last.date()))
    }

    pub fn filter(&self, range: &DateRange) -> Vec<&CallRecord> {
        self.records
            .iter()
            .filter(|r| range.contains(&r.timestamp))
            .collect()
    }
}

/// Parse a feed timestamp into a naive local date-time
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a date filter value; a date-time is accepted and truncated to its date.
///
/// Handles formats like:
/// - "2024-03-05"
/// - "2024-03-05T00:00:00"
pub fn parse_filter_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(0..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn coerce_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| !v.is_nan())
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_from_feed_coerces_drops_and_sorts() {
        let rows = vec![
            json!({"timestamp": "2024-03-02T10:00:00.000", "wait_time_seconds": "30", "talk_time_seconds": 120, "calls": "4"}),
            json!({"timestamp": "2024-03-01T09:00:00.000", "wait_time_seconds": 15.5, "talk_time_seconds": "90"}),
            json!({"timestamp": "2024-03-01T11:00:00.000", "wait_time_seconds": "n/a", "talk_time_seconds": "90"}),
            json!({"timestamp": "2024-03-03T08:00:00.000", "wait_time_seconds": "12"}),
        ];

        let table = CallTable::from_feed(rows).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.dropped(), 2);
        assert_eq!(table.records()[0].wait_time_seconds, 15.5);
        assert_eq!(table.records()[1].talk_time_seconds, 120.0);
        assert_eq!(
            table.columns(),
            &["timestamp", "wait_time_seconds", "talk_time_seconds", "calls"]
        );
    }

    #[test]
    fn test_from_feed_rejects_bad_timestamp() {
        let rows = vec![json!({"timestamp": "yesterday", "wait_time_seconds": 1, "talk_time_seconds": 2})];
        let err = CallTable::from_feed(rows).unwrap_err();
        assert!(matches!(err, FeedError::InvalidTimestamp { row: 0, .. }));
    }

    #[test]
    fn test_from_feed_skips_missing_timestamp() {
        let rows = vec![json!({"wait_time_seconds": 1, "talk_time_seconds": 2})];
        let table = CallTable::from_feed(rows).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.dropped(), 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T09:00:00.000").is_some());
        assert!(parse_timestamp("2024-03-01 09:00:00").is_some());
        assert!(parse_timestamp("2024-03-01T09:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T09:00").is_some());
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(date("2024-03-01").and_time(NaiveTime::MIN))
        );
        assert!(parse_timestamp("03/01/2024").is_none());
    }

    #[test]
    fn test_parse_filter_date() {
        assert_eq!(parse_filter_date("2024-03-05"), Some(date("2024-03-05")));
        assert_eq!(parse_filter_date("2024-03-05T00:00:00"), Some(date("2024-03-05")));
        assert_eq!(parse_filter_date("2024-3-5"), None);
        assert_eq!(parse_filter_date(""), None);
    }

    #[test]
    fn test_date_range_is_closed() {
        let range = DateRange::new(date("2024-03-01"), date("2024-03-02"));
        let late = parse_timestamp("2024-03-02T23:59:59").unwrap();
        let after = parse_timestamp("2024-03-03T00:00:00").unwrap();
        assert!(range.contains(&late));
        assert!(!range.contains(&after));
    }

    #[test]
    fn test_to_row_fills_missing_columns() {
        let rows = vec![
            json!({"timestamp": "2024-03-01T09:00:00", "wait_time_seconds": 1, "talk_time_seconds": 2}),
            json!({"timestamp": "2024-03-02T09:00:00", "wait_time_seconds": 3, "talk_time_seconds": 4, "queue": "general"}),
        ];
        let table = CallTable::from_feed(rows).unwrap();

        let row = table.records()[0].to_row(table.columns());
        assert_eq!(row["timestamp"], json!("2024-03-01T09:00:00"));
        assert_eq!(row["wait_time_seconds"], json!(1.0));
        assert_eq!(row["queue"], Value::Null);
    }
}
