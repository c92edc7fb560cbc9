use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use sauti_db::Database;
use sauti_providers::{ChatCompleter, Messenger};
use sauti_types::api::{LoginRequest, RegisterRequest, TokenResponse};

use crate::config::Config;
use crate::token::issue_token;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: Config,
    pub llm: Box<dyn ChatCompleter>,
    pub messenger: Box<dyn Messenger>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.full_name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Check if email is taken
    if state
        .db
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // Hash password with Argon2id; never store or return the plaintext
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    // The availability check above can lose a race with a concurrent
    // registration; the UNIQUE constraint on email is the backstop.
    let user = state
        .db
        .create_user(req.full_name.trim(), req.email.trim(), &password_hash, "user")
        .map_err(|e| {
            if sauti_db::is_constraint_violation(&e) {
                StatusCode::CONFLICT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    let token = issue_token(
        &state.config.jwt_secret,
        state.config.token_ttl_minutes,
        &user.email,
    )
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            role: Some(user.role),
            email: Some(user.email),
        }),
    ))
}

/// Unknown email and wrong password return the same 401 so the endpoint
/// cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state
        .db
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = issue_token(
        &state.config.jwt_secret,
        state.config.token_ttl_minutes,
        &user.email,
    )
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        role: Some(user.role),
        email: Some(user.email),
    }))
}
