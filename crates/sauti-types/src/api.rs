use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims shared between sauti-api (token issuing) and the auth
/// middleware. The subject is the user's email address. Canonical
/// definition lives here to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both /register and /login. The password hash never
/// appears in any response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// -- Users --

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

/// The admin dashboard round-trips the whole user object it fetched,
/// `id` and all, so unknown fields are tolerated here. The id in the
/// path is authoritative.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

// -- Incidents --

#[derive(Debug, Serialize)]
pub struct IncidentResponse {
    pub id: i64,
    pub location: String,
    pub description: String,
    pub anonymous: bool,
    pub reporter_email: Option<String>,
    pub attachment: Option<String>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Incident plus the classifier verdict. `predicted_category` is
/// "unknown" with confidence 0.0 whenever the external call failed or
/// returned something outside the fixed category set.
#[derive(Debug, Serialize)]
pub struct ClassifiedIncidentResponse {
    pub id: i64,
    pub location: String,
    pub description: String,
    pub anonymous: bool,
    pub reporter_email: Option<String>,
    pub attachment: Option<String>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub predicted_category: String,
    pub confidence: f64,
}

// -- Community chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendChatMessageRequest {
    pub user_email: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: i64,
    pub user_email: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Support chatbot --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupportChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SupportChatResponse {
    pub reply: String,
}

// -- Voice notes --

#[derive(Debug, Serialize)]
pub struct VoiceUploadResponse {
    pub stress_level: String,
    pub file_url: String,
    pub message: String,
}

// -- SOS --

#[derive(Debug, Deserialize)]
pub struct SosRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SosResponse {
    pub message_sid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_update_accepts_a_round_tripped_user_object() {
        // Admin clients PUT back the object they fetched, id included.
        let req: UpdateUserRequest = serde_json::from_str(
            r#"{"id": 3, "full_name": "Amina N.", "email": "amina@example.com", "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name.as_deref(), Some("Amina N."));
        assert_eq!(req.role.as_deref(), Some("admin"));
    }

    #[test]
    fn register_rejects_unknown_fields() {
        let err = serde_json::from_str::<RegisterRequest>(
            r#"{"full_name": "A", "email": "a@example.com", "password": "longenough", "role": "admin"}"#,
        );
        assert!(err.is_err());
    }
}
