use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{chat, chatbot, incidents, sos, users, voice};

/// Voice notes can reach 20 MB; leave headroom for the rest of the form.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Assemble the full application router. Panic-path endpoints (SOS, voice
/// SOS, support chat) stay public; everything touching stored records goes
/// through the auth gateway.
pub fn build_router(state: AppState, upload_dir: &Path) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Clients reach this with and without the trailing slash; axum
        // treats those as distinct paths, so register both.
        .route("/support-chatbot", post(chatbot::support_chat))
        .route("/support-chatbot/", post(chatbot::support_chat))
        .route("/upload-voice", post(voice::upload_voice))
        .route("/contact", post(sos::contact))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/incidents/",
            post(incidents::report_incident).get(incidents::list_by_reporter),
        )
        .route("/incidents/all-incidents", get(incidents::list_all))
        .route(
            "/incidents/classified-incidents",
            get(incidents::list_classified),
        )
        .route("/incidents/{id}/status", put(incidents::update_status))
        .route("/chat/", post(chat::send_message).get(chat::get_messages))
        .route("/active", get(users::list_users))
        .route(
            "/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
