use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{ProfileState, UserId};
use super::repository::{PredictionClient, ProfileStore};
use super::service::{ProfileSubmissionService, SubmissionError};
use super::taxonomy::{taxonomy_view, TaxonomyView};
use super::validation::validate;

/// Router builder exposing taxonomy, session, validation, and submission endpoints.
pub fn profile_router<P, S>(service: Arc<ProfileSubmissionService<P, S>>) -> Router
where
    P: PredictionClient + 'static,
    S: ProfileStore + 'static,
{
    Router::new()
        .route("/api/v1/taxonomy", get(taxonomy_handler))
        .route("/api/v1/profiles/:user_id", get(session_handler::<P, S>))
        .route(
            "/api/v1/profiles/:user_id/validation",
            post(validation_handler),
        )
        .route(
            "/api/v1/profiles/:user_id/submissions",
            post(submit_handler::<P, S>),
        )
        .with_state(service)
}

pub(crate) async fn taxonomy_handler() -> Json<TaxonomyView> {
    Json(taxonomy_view())
}

pub(crate) async fn session_handler<P, S>(
    State(service): State<Arc<ProfileSubmissionService<P, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: PredictionClient + 'static,
    S: ProfileStore + 'static,
{
    match service.resume(UserId(user_id)).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validation_handler(
    Path(_user_id): Path<String>,
    payload: Result<Json<ProfileState>, JsonRejection>,
) -> Response {
    let Json(profile) = match payload {
        Ok(profile) => profile,
        Err(rejection) => return rejection_response(rejection),
    };
    let errors = validate(&profile);
    let payload = json!({
        "ready": errors.is_clean(),
        "errors": errors,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<P, S>(
    State(service): State<Arc<ProfileSubmissionService<P, S>>>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileState>, JsonRejection>,
) -> Response
where
    P: PredictionClient + 'static,
    S: ProfileStore + 'static,
{
    let Json(profile) = match payload {
        Ok(profile) => profile,
        Err(rejection) => return rejection_response(rejection),
    };
    let user_id = UserId(user_id);
    match service.submit(&user_id, profile).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: SubmissionError) -> Response {
    let status = error.status_code();
    let payload = match error.validation_errors() {
        Some(errors) => json!({
            "error": error.user_message(),
            "errors": errors,
        }),
        None => json!({
            "error": error.user_message(),
        }),
    };
    (status, Json(payload)).into_response()
}

/// Unreadable profile bodies get 400 so they are never confused with field errors (422).
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    let payload = json!({
        "error": format!("invalid profile: {}", rejection.body_text()),
    });
    (status, Json(payload)).into_response()
}
