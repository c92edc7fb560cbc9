use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::auth::AppState;
use crate::token::validate_token;

/// The resolved user behind the bearer token, injected into request
/// extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

/// Extract and validate the bearer token, then resolve its subject to a
/// user record. A valid token whose subject no longer exists is rejected
/// the same way as an invalid one.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let subject =
        validate_token(&state.config.jwt_secret, token).map_err(|_| StatusCode::UNAUTHORIZED)?;

    let db = state.clone();
    let email = subject.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_email(&email))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        full_name: user.full_name,
        email: user.email,
        role: user.role,
    });
    Ok(next.run(req).await)
}

/// Role gate for operator-only operations.
pub fn require_admin(user: &CurrentUser) -> Result<(), StatusCode> {
    if user.role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> CurrentUser {
        CurrentUser {
            id: 1,
            full_name: "Amina N.".into(),
            email: "amina@example.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn admin_gate_rejects_plain_users() {
        assert_eq!(require_admin(&user("user")), Err(StatusCode::FORBIDDEN));
        assert_eq!(require_admin(&user("admin")), Ok(()));
    }
}
