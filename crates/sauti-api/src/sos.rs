use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use sauti_providers::Messenger;
use sauti_types::api::{SosRequest, SosResponse};

use crate::auth::AppState;

/// POST /contact — send an SOS with a map link to the given phone number.
/// Provider failure surfaces as a plain 500; no retries.
pub async fn contact(
    State(state): State<AppState>,
    Json(req): Json<SosRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.phone.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let body = sos_body(req.latitude, req.longitude, req.message.as_deref());

    let message_sid = state
        .messenger
        .send_message(req.phone.trim(), &body)
        .await
        .map_err(|e| {
            error!("SOS dispatch failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(SosResponse { message_sid }))
}

fn sos_body(latitude: f64, longitude: f64, message: Option<&str>) -> String {
    let text = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("SOS Alert! I need help!");

    format!(
        "{}\nLocation: https://maps.google.com/?q={},{}",
        text, latitude, longitude
    )
}

#[cfg(test)]
mod tests {
    use super::sos_body;

    #[test]
    fn body_embeds_coordinates() {
        let body = sos_body(-26.2041, 28.0473, None);
        assert!(body.contains("https://maps.google.com/?q=-26.2041,28.0473"));
        assert!(body.starts_with("SOS Alert! I need help!"));
    }

    #[test]
    fn custom_message_replaces_default() {
        let body = sos_body(0.0, 0.0, Some("Please come now"));
        assert!(body.starts_with("Please come now"));
    }

    #[test]
    fn blank_message_falls_back_to_default() {
        let body = sos_body(0.0, 0.0, Some("   "));
        assert!(body.starts_with("SOS Alert! I need help!"));
    }
}
