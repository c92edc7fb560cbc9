use axum::{Json, extract::{Multipart, State}, http::StatusCode, response::IntoResponse};
use tracing::error;
use uuid::Uuid;

use sauti_providers::Messenger;
use sauti_types::api::VoiceUploadResponse;

use crate::auth::AppState;

/// 20 MB cap on voice notes.
const MAX_VOICE_SIZE: usize = 20 * 1024 * 1024;

/// POST /upload-voice — multipart `file` plus an optional `message`.
///
/// Persists the raw upload under a randomized name, derives the stress
/// label from RMS energy and pitch, records the metadata, and notifies
/// the configured alert number. Decode or provider failure surfaces as a
/// plain 500; there is no degraded path here.
pub async fn upload_voice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, StatusCode> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut message: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("voice-note.wav")
                    .to_string();
                let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                file = Some((file_name, bytes.to_vec()));
            }
            "message" => {
                message = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or(StatusCode::BAD_REQUEST)?;
    if bytes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if bytes.len() > MAX_VOICE_SIZE {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    // Persist the raw upload first so the clip survives even if analysis fails
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| {
            error!("Failed to create upload directory: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let stored_name = format!(
        "{}_{}",
        Uuid::new_v4().simple(),
        crate::sanitize_filename(&file_name, "voice-note.wav")
    );
    let path = state.config.upload_dir.join(&stored_name);
    tokio::fs::write(&path, &bytes).await.map_err(|e| {
        error!("Failed to write voice note {}: {}", path.display(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Decode + analysis is CPU work; run it off the async runtime
    let analysis = tokio::task::spawn_blocking(move || sauti_audio::analyze_wav(&bytes))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("voice note decode failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let stress_level = analysis.level.as_str().to_string();
    let file_url = format!(
        "{}/uploads/{}",
        state.config.public_base_url.trim_end_matches('/'),
        stored_name
    );

    let db = state.clone();
    let (name_for_db, url_for_db, level_for_db) =
        (stored_name.clone(), file_url.clone(), stress_level.clone());
    tokio::task::spawn_blocking(move || {
        db.db.insert_voice_note(
            &name_for_db,
            &url_for_db,
            &level_for_db,
            analysis.energy as f64,
            analysis.pitch_hz as f64,
        )
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(alert_number) = &state.config.sos_alert_number {
        let mut body = format!("Voice SOS received — {}. Listen: {}", stress_level, file_url);
        if let Some(msg) = &message {
            if !msg.trim().is_empty() {
                body = format!("{}\n\"{}\"", body, msg.trim());
            }
        }

        state
            .messenger
            .send_message(alert_number, &body)
            .await
            .map_err(|e| {
                error!("voice SOS notification failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
    }

    Ok(Json(VoiceUploadResponse {
        stress_level,
        file_url,
        message: "Voice note analyzed".to_string(),
    }))
}
