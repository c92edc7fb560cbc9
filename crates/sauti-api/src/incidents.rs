use axum::{
    Extension, Form, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use sauti_db::models::IncidentRow;
use sauti_providers::ChatCompleter;
use sauti_types::api::{ClassifiedIncidentResponse, IncidentResponse};

use crate::auth::AppState;
use crate::middleware::{CurrentUser, require_admin};
use crate::parse_timestamp;

/// Fixed category set the classifier must choose from. Anything else
/// degrades to "unknown".
pub const CATEGORIES: [&str; 6] = [
    "physical violence",
    "sexual violence",
    "emotional abuse",
    "financial abuse",
    "harassment",
    "other",
];

const FALLBACK_CATEGORY: &str = "unknown";

#[derive(Debug, Deserialize)]
pub struct ReporterQuery {
    pub reporter_email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// POST /incidents/ — multipart form: location, description, anonymous,
/// reporter_email?, attachment?. Anonymous reports discard the reporter
/// email regardless of what was submitted.
pub async fn report_incident(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StatusCode> {
    let mut location: Option<String> = None;
    let mut description: Option<String> = None;
    let mut anonymous = false;
    let mut reporter_email: Option<String> = None;
    let mut attachment: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "location" => {
                location = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            "anonymous" => {
                let raw = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                anonymous = matches!(raw.trim(), "true" | "True" | "1");
            }
            "reporter_email" => {
                let raw = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                if !raw.trim().is_empty() {
                    reporter_email = Some(raw.trim().to_string());
                }
            }
            "attachment" => {
                let name = crate::sanitize_filename(
                    field.file_name().unwrap_or("attachment"),
                    "attachment",
                );
                let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                if !bytes.is_empty() {
                    attachment = Some((name, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    let location = location.filter(|s| !s.trim().is_empty()).ok_or(StatusCode::BAD_REQUEST)?;
    let description = description.filter(|s| !s.trim().is_empty()).ok_or(StatusCode::BAD_REQUEST)?;
    let reporter_email = effective_reporter(anonymous, reporter_email);

    // Persist the attachment under a randomized unique name so two uploads
    // named the same can never overwrite each other.
    let mut attachment_path: Option<String> = None;
    if let Some((name, bytes)) = attachment {
        tokio::fs::create_dir_all(&state.config.upload_dir)
            .await
            .map_err(|e| {
                error!("Failed to create upload directory: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), name);
        let path = state.config.upload_dir.join(&stored_name);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            error!("Failed to write attachment {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        attachment_path = Some(format!("uploads/{}", stored_name));
    }

    let db = state.clone();
    let incident = tokio::task::spawn_blocking(move || {
        db.db.insert_incident(
            &location,
            &description,
            anonymous,
            reporter_email.as_deref(),
            attachment_path.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(to_response(incident))))
}

/// GET /incidents/?reporter_email=… — exact-match filter.
pub async fn list_by_reporter(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Query(query): Query<ReporterQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || {
        db.db.list_incidents_by_reporter(&query.reporter_email)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let incidents: Vec<IncidentResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(incidents))
}

/// GET /incidents/all-incidents — admin only.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_all_incidents())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let incidents: Vec<IncidentResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(incidents))
}

/// PUT /incidents/{id}/status — admin only. The status is an open string
/// by design; any value is accepted.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let updated = tokio::task::spawn_blocking(move || db.db.update_incident_status(id, &form.status))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(to_response(updated)))
}

/// GET /incidents/classified-incidents — admin only. Every incident is run
/// through the external classifier; a failed or unparsable call degrades
/// that one incident to "unknown" / 0.0 instead of failing the batch.
pub async fn list_classified(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_all_incidents())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let system = classifier_prompt();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let (category, confidence) = match state.llm.complete_chat(&system, &row.description).await
        {
            Ok(raw) => parse_classification(&raw)
                .unwrap_or_else(|| (FALLBACK_CATEGORY.to_string(), 0.0)),
            Err(e) => {
                warn!("classifier call failed for incident {}: {}", row.id, e);
                (FALLBACK_CATEGORY.to_string(), 0.0)
            }
        };

        out.push(to_classified_response(row, category, confidence));
    }

    Ok(Json(out))
}

/// Anonymous reports never persist a reporter identity, whatever the
/// client sent.
pub(crate) fn effective_reporter(anonymous: bool, reporter_email: Option<String>) -> Option<String> {
    if anonymous { None } else { reporter_email }
}

fn classifier_prompt() -> String {
    format!(
        "You classify gender-based-violence incident reports. \
         Read the report and respond with ONLY a JSON object of the form \
         {{\"category\": \"<category>\", \"confidence\": <0.0-1.0>}}. \
         The category must be exactly one of: {}.",
        CATEGORIES.join(", ")
    )
}

/// Parse the model's reply. None for anything that is not strict JSON
/// with a category from the fixed set and a confidence in [0, 1].
pub(crate) fn parse_classification(raw: &str) -> Option<(String, f64)> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let category = value.get("category")?.as_str()?.trim().to_lowercase();
    let confidence = value.get("confidence")?.as_f64()?;

    if !CATEGORIES.contains(&category.as_str()) {
        return None;
    }
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }

    Some((category, confidence))
}

fn to_response(row: IncidentRow) -> IncidentResponse {
    IncidentResponse {
        id: row.id,
        location: row.location,
        description: row.description,
        anonymous: row.anonymous,
        reporter_email: row.reporter_email,
        attachment: row.attachment,
        status: row.status,
        created_at: parse_timestamp(&row.created_at),
    }
}

fn to_classified_response(
    row: IncidentRow,
    predicted_category: String,
    confidence: f64,
) -> ClassifiedIncidentResponse {
    ClassifiedIncidentResponse {
        id: row.id,
        location: row.location,
        description: row.description,
        anonymous: row.anonymous,
        reporter_email: row.reporter_email,
        attachment: row.attachment,
        status: row.status,
        created_at: parse_timestamp(&row.created_at),
        predicted_category,
        confidence,
    }
}
