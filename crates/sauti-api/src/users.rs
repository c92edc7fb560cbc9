use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use sauti_db::models::UserRow;
use sauti_types::api::{UpdateUserRequest, UserResponse};

use crate::auth::AppState;
use crate::middleware::{CurrentUser, require_admin};

/// GET /active — every registered user, for the admin dashboard.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_users())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let users: Vec<UserResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(users))
}

/// PUT /users/{id} — admin only; missing fields are left unchanged.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let updated = tokio::task::spawn_blocking(move || {
        db.db.update_user(
            id,
            req.full_name.as_deref(),
            req.email.as_deref(),
            req.role.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(to_response(updated)))
}

/// DELETE /users/{id} — admin only.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    require_admin(&user)?;

    let db = state.clone();
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_user(id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !deleted {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        full_name: row.full_name,
        email: row.email,
        role: row.role,
    }
}
