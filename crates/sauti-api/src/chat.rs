use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use sauti_db::models::ChatMessageRow;
use sauti_types::api::{ChatMessageResponse, SendChatMessageRequest};

use crate::auth::AppState;
use crate::middleware::CurrentUser;
use crate::parse_timestamp;

/// POST /chat/ — append a message to the community chat log.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(req): Json<SendChatMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.content.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.insert_chat_message(&req.user_email, &req.content)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// GET /chat/ — the full history, oldest first. No pagination.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_chat_messages())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let messages: Vec<ChatMessageResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(messages))
}

fn to_response(row: ChatMessageRow) -> ChatMessageResponse {
    ChatMessageResponse {
        id: row.id,
        user_email: row.user_email,
        content: row.content,
        created_at: parse_timestamp(&row.created_at),
    }
}
