// Dashboard service - Date range filtering of the buffered call table
use crate::application::call_feed::CallFeed;
use crate::domain::calls::{CallRecord, CallTable, DateRange, TALK_TIME, WAIT_TIME};
use crate::domain::chart::{ChartData, SeriesData, TimeSeriesPoint};
use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DASHBOARD_TITLE: &str = "Winnipeg 311 Call Wait Times Dashboard";
pub const CHART_ID: &str = "wait-talk-time-graph";
pub const CHART_TITLE: &str = "Wait Time and Talk Time Over Time";

/// Table rows and chart for one date range
#[derive(Debug, Clone, Serialize)]
pub struct DashboardUpdate {
    pub rows: Vec<Map<String, Value>>,
    pub chart: ChartData,
}

#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub table: TablePage,
    pub chart: ChartData,
}

#[derive(Clone)]
pub struct CallDashboardService {
    table: Arc<CallTable>,
    page_size: usize,
}

impl CallDashboardService {
    pub fn new(table: CallTable, page_size: usize) -> Self {
        Self {
            table: Arc::new(table),
            page_size: page_size.max(1),
        }
    }

    /// Fetch and buffer the feed. Any failure here is fatal to startup.
    pub async fn load(feed: &dyn CallFeed, page_size: usize) -> anyhow::Result<Self> {
        tracing::info!("Fetching call records from {}", feed.describe());
        let raw = feed.fetch_records().await?;
        let fetched = raw.len();

        let table = CallTable::from_feed(raw).context("Failed to load call records")?;
        tracing::info!(
            "Loaded {} call records ({} of {} rows dropped)",
            table.len(),
            table.dropped(),
            fetched
        );

        Ok(Self::new(table, page_size))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Initial value of the date range control
    pub fn date_bounds(&self) -> Option<DateRange> {
        self.table.date_bounds()
    }

    /// Recompute table rows and chart for `range` from the full table.
    /// An empty selection is a valid result, not an error.
    pub fn update(&self, range: DateRange) -> DashboardUpdate {
        let selected = self.table.filter(&range);
        tracing::debug!(
            "Date range {}..={} selects {} records",
            range.start,
            range.end,
            selected.len()
        );

        let columns = self.table.columns();
        DashboardUpdate {
            rows: selected.iter().map(|r| r.to_row(columns)).collect(),
            chart: build_chart(&selected),
        }
    }

    /// `update` with the table rows cut to one 1-based page
    pub fn view(&self, range: DateRange, page: usize) -> DashboardView {
        let DashboardUpdate { rows, chart } = self.update(range);

        let total_rows = rows.len();
        let page_count = total_rows.div_ceil(self.page_size).max(1);
        let page = page.clamp(1, page_count);
        let rows = rows
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        DashboardView {
            table: TablePage {
                columns: self.table.columns().to_vec(),
                rows,
                page,
                page_size: self.page_size,
                total_rows,
                page_count,
            },
            chart,
        }
    }
}

fn build_chart(records: &[&CallRecord]) -> ChartData {
    let metrics: [(&str, &str, fn(&CallRecord) -> f64); 2] = [
        (WAIT_TIME, "#1f77b4", |r| r.wait_time_seconds),
        (TALK_TIME, "#ff7f0e", |r| r.talk_time_seconds),
    ];

    let series = metrics
        .into_iter()
        .filter_map(|(id, color, value)| {
            let points: Vec<TimeSeriesPoint> = records
                .iter()
                .map(|r| TimeSeriesPoint::new(r.timestamp.and_utc().timestamp_millis(), value(*r)))
                .collect();

            // Only add series that have data
            if points.is_empty() {
                return None;
            }
            Some(SeriesData::new(
                id.to_string(),
                id.to_string(),
                color.to_string(),
                points,
            ))
        })
        .collect();

    ChartData {
        id: CHART_ID.to_string(),
        title: CHART_TITLE.to_string(),
        x_label: "Timestamp".to_string(),
        y_label: "Time (Seconds)".to_string(),
        legend_title: "Metric".to_string(),
        series,
    }
}
