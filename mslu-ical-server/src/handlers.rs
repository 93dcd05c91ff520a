use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use mslu_ical_core::prelude::*;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{cache::RedisCache, config::Settings};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ScheduleClient>,
    pub cache: CacheManager<RedisCache>,
    pub cache_ttl: Duration,
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Calendar request parameters
#[derive(Deserialize)]
struct CalendarQuery {
    /// Prepended verbatim to every event title; may contain emoji.
    title_prefix: Option<String>,
}

pub async fn create_app(settings: &Settings) -> Result<Router, mslu_ical_core::Error> {
    let identity = Arc::new(RotatingIdentity::with_defaults());
    let client = Arc::new(ScheduleClient::new(
        settings.schedule_base_url.clone(),
        identity,
    ));
    let redis_cache =
        RedisCache::new(&settings.redis_url, Some(settings.redis_prefix.clone())).await?;

    let state = AppState {
        client,
        cache: CacheManager::new(redis_cache),
        cache_ttl: settings.cache_ttl,
    };

    // Both /api/students routes share the `{id}` segment; the router picks
    // the literal `uni_lessons.ics` branch over the `{education_form}` one.
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/students/{id}/{education_form}", get(groups_listing_handler))
        .route("/api/students/{id}/uni_lessons.ics", get(group_calendar_handler))
        .route("/api/teachers", get(teacher_names_handler))
        .route("/api/teachers/{id}/uni_lessons.ics", get(teacher_calendar_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    Ok(router)
}

/// Root path handler
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "MSLU ICal Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "iCalendar relay for the MSLU class schedule",
        "endpoints": {
            "health": "/health",
            "group_calendar": "/api/students/{group_id}/uni_lessons.ics",
            "teacher_calendar": "/api/teachers/{teacher_id}/uni_lessons.ics",
            "groups_listing": "/api/students/{faculty_id}/{education_form}",
            "teacher_names": "/api/teachers"
        }
    }))
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// "Today" in the schedule's timezone; anchors all week-date computation.
fn minsk_today() -> NaiveDate {
    Utc::now().with_timezone(&minsk_tz()).date_naive()
}

/// Cache read that degrades to a miss when the backend is unavailable.
async fn cache_get(state: &AppState, key: &str) -> Option<String> {
    match state.cache.get::<String>(key).await {
        Ok(hit) => hit,
        Err(e) => {
            tracing::warn!(key, error = %e, "cache read failed, fetching live");
            None
        }
    }
}

/// Cache write that only logs on failure; caching is best-effort.
async fn cache_put(state: &AppState, key: &str, value: &String) {
    if let Err(e) = state.cache.set(key, value, state.cache_ttl).await {
        tracing::warn!(key, error = %e, "cache write failed");
    }
}

fn calendar_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Mirror an upstream listing response, status code included.
fn listing_response(listing: &RawListing) -> Response {
    let status = StatusCode::from_u16(listing.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        listing.body.clone(),
    )
        .into_response()
}

/// Group schedule as an iCalendar document.
async fn group_calendar_handler(
    Path(group_id): Path<u32>,
    Query(params): Query<CalendarQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let prefix = params.title_prefix.unwrap_or_default();
    let key = rendered_key("students.ics", &format!("{}:{}", group_id, prefix));

    if let Some(body) = cache_get(&state, &key).await {
        return Ok(calendar_response(body));
    }

    let lessons = state
        .client
        .full_schedule(ScheduleTarget::Group(group_id), minsk_today())
        .await;

    let events = lessons
        .iter()
        .map(|lesson| student_event(lesson, &prefix))
        .collect::<Result<Vec<_>, _>>()?;

    let body = CalendarBuilder::default().generate(&events)?;
    cache_put(&state, &key, &body).await;

    Ok(calendar_response(body))
}

/// Teacher schedule as an iCalendar document, deduplicated across groups.
async fn teacher_calendar_handler(
    Path(teacher_id): Path<u32>,
    Query(params): Query<CalendarQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let prefix = params.title_prefix.unwrap_or_default();
    let key = rendered_key("teachers.ics", &format!("{}:{}", teacher_id, prefix));

    if let Some(body) = cache_get(&state, &key).await {
        return Ok(calendar_response(body));
    }

    let lessons = state
        .client
        .full_schedule(ScheduleTarget::Teacher(teacher_id), minsk_today())
        .await;

    let events = merge_groups(lessons)
        .iter()
        .map(|lesson| teacher_event(lesson, &prefix))
        .collect::<Result<Vec<_>, _>>()?;

    let body = CalendarBuilder::default().generate(&events)?;
    cache_put(&state, &key, &body).await;

    Ok(calendar_response(body))
}

/// Groups listing passthrough, mirrored from upstream.
async fn groups_listing_handler(
    Path((faculty_id, education_form)): Path<(u32, u32)>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let key = rendered_key("students.groups", &format!("{}:{}", faculty_id, education_form));

    if let Some(body) = cache_get(&state, &key).await {
        return Ok(listing_response(&RawListing { status: 200, body }));
    }

    let listing = state
        .client
        .groups_listing(faculty_id, education_form)
        .await?;

    // Upstream errors are mirrored but never cached.
    if listing.is_success() {
        cache_put(&state, &key, &listing.body).await;
    }

    Ok(listing_response(&listing))
}

/// Teacher-names listing passthrough, mirrored from upstream.
async fn teacher_names_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let key = rendered_key("teachers.names", "");

    if let Some(body) = cache_get(&state, &key).await {
        return Ok(listing_response(&RawListing { status: 200, body }));
    }

    let listing = state.client.teacher_names().await?;

    if listing.is_success() {
        cache_put(&state, &key, &listing.body).await;
    }

    Ok(listing_response(&listing))
}

/// Application error type
#[derive(Debug)]
struct AppError(mslu_ical_core::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            mslu_ical_core::Error::Http(_) => (StatusCode::BAD_GATEWAY, "upstream request failed"),
            mslu_ical_core::Error::Json(_) => {
                (StatusCode::BAD_GATEWAY, "upstream response malformed")
            }
            mslu_ical_core::Error::UpstreamStatus { .. } => {
                (StatusCode::BAD_GATEWAY, "upstream error status")
            }
            mslu_ical_core::Error::Config(_) => (StatusCode::BAD_REQUEST, "invalid request"),
            mslu_ical_core::Error::RecordField(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid schedule data")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<mslu_ical_core::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
