// HTTP request handlers for the call dashboard
use crate::application::dashboard_service::{DashboardView, DASHBOARD_TITLE};
use crate::domain::calls::{parse_filter_date, DateRange};
use crate::presentation::app_state::DashboardState;
use crate::presentation::dashboard_page::render_page;
use crate::presentation::error::ApiError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct UpdateQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<usize>,
}

/// Dashboard page with the date range control preset to the data bounds
pub async fn dashboard_page(State(state): State<Arc<DashboardState>>) -> Html<String> {
    let service = &state.dashboard_service;
    Html(render_page(
        DASHBOARD_TITLE,
        service.date_bounds(),
        service.page_size(),
    ))
}

/// Table page and chart for the selected date range
pub async fn update_dashboard(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<UpdateQuery>, QueryRejection>,
) -> Result<Json<DashboardView>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::InvalidForm(rejection.body_text()))?;
    let service = &state.dashboard_service;
    let bounds = service.date_bounds();

    let start = resolve_date(query.start_date.as_deref(), bounds.map(|b| b.start))?;
    let end = resolve_date(query.end_date.as_deref(), bounds.map(|b| b.end))?;

    let view = match (start, end) {
        (Some(start), Some(end)) => service.view(DateRange::new(start, end), query.page.unwrap_or(1)),
        // empty dataset and no explicit range: nothing can match
        _ => service.view(DateRange::new(NaiveDate::MAX, NaiveDate::MIN), 1),
    };

    Ok(Json(view))
}

fn resolve_date(raw: Option<&str>, fallback: Option<NaiveDate>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_filter_date(raw)
            .map(Some)
            .ok_or_else(|| ApiError::InvalidDate(raw.to_string())),
        None => Ok(fallback),
    }
}
