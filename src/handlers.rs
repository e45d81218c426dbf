use crate::compliance::{compute_compliance, mark_complete};
use crate::dates::date_key;
use crate::errors::AppError;
use crate::models::{
    Athlete, CompleteRequest, CompletionResponse, ComplianceQuery, ComplianceResponse,
    DailyPoint, DateQuery, GroupBy, LogEntry, LogPatch, NewLogEntry, PersonalRecord,
    PlanDayResponse, PlanSummary, ReportQuery, VolumeResponse,
};
use crate::reports::{daily_volume, personal_records, weekly_volume, weekly_volume_grouped};
use crate::schedule::resolve_day;
use crate::state::AppState;
use crate::storage::{persist_data, LogFilter};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use tracing::info;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_athlete(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
) -> Result<Json<Athlete>, AppError> {
    let data = state.data.lock().await;
    let athlete = data
        .athlete(&athlete_id)
        .ok_or_else(|| AppError::not_found("athlete not found"))?;
    Ok(Json(athlete.clone()))
}

pub async fn plan_day(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<PlanDayResponse>, AppError> {
    let on_date = query.date.unwrap_or_else(today);
    let data = state.data.lock().await;
    let athlete = data
        .athlete(&athlete_id)
        .ok_or_else(|| AppError::not_found("athlete not found"))?;

    let mut response = PlanDayResponse {
        athlete_id: athlete.id.clone(),
        date: date_key(on_date),
        plan: None,
        day_index: None,
        day: None,
        message: None,
    };

    let Some(plan_id) = athlete.plan_id.as_deref() else {
        response.message = Some("No plan assigned.".into());
        return Ok(Json(response));
    };
    let Some(start) = athlete.plan_start_date else {
        response.message = Some("Plan start date not set.".into());
        return Ok(Json(response));
    };
    let plan = data
        .plan(plan_id)
        .ok_or_else(|| AppError::not_found("plan missing for athlete"))?;

    response.plan = Some(PlanSummary {
        id: plan.id.clone(),
        name: plan.name.clone(),
        weeks: plan.weeks,
    });
    match resolve_day(&plan.days, start, on_date) {
        Some(resolved) => {
            response.day_index = Some(resolved.index);
            response.day = Some(resolved.day.clone());
        }
        None => response.message = Some("Plan has no days.".into()),
    }

    Ok(Json(response))
}

pub async fn complete_day(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CompletionResponse>, AppError> {
    let date = completion_date(&headers, &body)?.unwrap_or_else(today);

    let mut data = state.data.lock().await;
    let athlete = data
        .athlete_mut(&athlete_id)
        .ok_or_else(|| AppError::not_found("athlete not found"))?;
    mark_complete(athlete, date);
    let completed_records = athlete.completed_dates.len();

    if let Err(err) = persist_data(&state.data_path, &data).await {
        if let Some(athlete) = data.athlete_mut(&athlete_id) {
            athlete.completed_dates.pop();
        }
        return Err(err);
    }
    info!(athlete = %athlete_id, %date, "recorded completed day");

    Ok(Json(CompletionResponse {
        athlete_id,
        date: date_key(date),
        completed_records,
    }))
}

pub async fn compliance(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    Query(query): Query<ComplianceQuery>,
) -> Result<Json<ComplianceResponse>, AppError> {
    let on_date = query.date.unwrap_or_else(today);
    let data = state.data.lock().await;
    let athlete = data
        .athlete(&athlete_id)
        .ok_or_else(|| AppError::not_found("athlete not found"))?;

    let plan_id = query.plan_id.as_deref().or(athlete.plan_id.as_deref());
    let plan = plan_id.and_then(|id| data.plan(id));

    let response: ComplianceResponse = match compute_compliance(athlete, plan, on_date) {
        Ok(compliance) => compliance.into(),
        Err(reason) => ComplianceResponse::NotComputable {
            reason: reason.to_string(),
        },
    };
    Ok(Json(response))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<LogEntry>>, AppError> {
    let data = state.data.lock().await;
    let logs: Vec<LogEntry> = data
        .query_logs(&filter_from(&query))
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(logs))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(payload): Json<NewLogEntry>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let mut data = state.data.lock().await;
    let entry = data.create_log(payload, today())?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.logs.pop();
        return Err(err);
    }
    info!(log = %entry.id, athlete = %entry.user_id, "logged set");

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<Json<LogEntry>, AppError> {
    let data = state.data.lock().await;
    let entry = data
        .log(&log_id)
        .ok_or_else(|| AppError::not_found("log not found"))?;
    Ok(Json(entry.clone()))
}

pub async fn update_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
    Json(patch): Json<LogPatch>,
) -> Result<Json<LogEntry>, AppError> {
    let mut data = state.data.lock().await;
    let previous = data
        .log(&log_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("log not found"))?;
    let entry = data.update_log(&log_id, patch)?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        if let Some(slot) = data.logs.iter_mut().find(|entry| entry.id == log_id) {
            *slot = previous;
        }
        return Err(err);
    }
    info!(log = %entry.id, "updated set");

    Ok(Json(entry))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mut data = state.data.lock().await;
    let (pos, removed) = data
        .delete_log(&log_id)
        .ok_or_else(|| AppError::not_found("log not found"))?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.logs.insert(pos, removed);
        return Err(err);
    }
    info!(log = %log_id, "deleted set");

    Ok(Json(json!({ "success": true })))
}

pub async fn volume_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<VolumeResponse>, AppError> {
    let data = state.data.lock().await;
    let logs = data.query_logs(&filter_from(&query));

    let response = match query.group_by {
        Some(group_by @ (GroupBy::Exercise | GroupBy::User)) => {
            VolumeResponse::Grouped(weekly_volume_grouped(logs, group_by, &*data))
        }
        _ => VolumeResponse::Totals(weekly_volume(logs)),
    };
    Ok(Json(response))
}

pub async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<DailyPoint>>, AppError> {
    let window = query.window.unwrap_or(state.default_ma_window);
    let data = state.data.lock().await;
    Ok(Json(daily_volume(data.query_logs(&filter_from(&query)), window)))
}

pub async fn records_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<PersonalRecord>>, AppError> {
    let data = state.data.lock().await;
    let logs = data.query_logs(&filter_from(&query));
    Ok(Json(personal_records(logs, &*data)))
}

fn filter_from(query: &ReportQuery) -> LogFilter {
    LogFilter {
        user_id: query.user_id.clone().filter(|id| !id.is_empty()),
        exercise_id: query.exercise_id.clone().filter(|id| !id.is_empty()),
        from: query.from,
        to: query.to,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Date named by a completion body. An empty body means today; anything
/// else must be a JSON `CompleteRequest`.
fn completion_date(headers: &HeaderMap, body: &[u8]) -> Result<Option<NaiveDate>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    if !is_json(headers) {
        return Err(AppError::bad_request("expected an application/json body"));
    }
    let Json(request) = Json::<CompleteRequest>::from_bytes(body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    Ok(request.date)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json"))
}
