//! HTTP routes.
//!
//! The calculation relay exposes two of the rules engine's pure operations.
//! Nothing is stored between requests.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;

use whisperspace_shared::{
    AttackOutcomeRequest, AttackOutcomeResponse, ErrorBody, ErrorCode, MissingFields,
    NotationRequestError, NotationResponse, SkillNotationRequest,
};

use super::auth::require_api_key;
use crate::app::App;

/// Path prefix of the calculation relay
pub const CALC_PREFIX: &str = "/rules-api/calc";

/// Create all HTTP routes.
pub fn routes(app: Arc<App>) -> Router {
    let calc = Router::new()
        .route("/attack", post(calc_attack))
        .route("/notation", post(calc_notation))
        .fallback(unknown_endpoint)
        .layer(middleware::from_fn_with_state(app.clone(), require_api_key));

    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .nest(CALC_PREFIX, calc)
        .with_state(app)
}

async fn health() -> &'static str {
    "OK"
}

async fn calc_attack(
    State(app): State<Arc<App>>,
    body: Bytes,
) -> Result<Json<AttackOutcomeResponse>, ApiError> {
    let input = parse_body::<AttackOutcomeRequest>(&body)?.validate()?;
    let outcome =
        app.rules
            .resolve_attack(input.total, input.use_dc, input.weapon_damage, &input.label);
    tracing::debug!(
        total = outcome.total,
        use_dc = outcome.use_dc,
        hit = outcome.hit,
        "Calculated attack outcome"
    );
    Ok(Json(outcome.into()))
}

async fn calc_notation(body: Bytes) -> Result<Json<NotationResponse>, ApiError> {
    let response = parse_body::<SkillNotationRequest>(&body)?.build()?;
    Ok(Json(response))
}

async fn unknown_endpoint() -> ApiError {
    ApiError::UnknownEndpoint
}

/// Reads a JSON body. An empty body counts as `{}` so every missing field
/// is reported at once.
fn parse_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    MissingFields(MissingFields),
    InvalidRequest(String),
    Unauthorized,
    ServerNotConfigured,
    UnknownEndpoint,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ServerNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnknownEndpoint => StatusCode::NOT_FOUND,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::MissingFields(missing) => {
                ErrorBody::with_message(ErrorCode::MissingFields, missing.to_string())
            }
            ApiError::InvalidRequest(msg) => {
                ErrorBody::with_message(ErrorCode::InvalidRequest, msg)
            }
            ApiError::Unauthorized => ErrorBody::new(ErrorCode::Unauthorized),
            ApiError::ServerNotConfigured => ErrorBody::new(ErrorCode::ServerNotConfigured),
            ApiError::UnknownEndpoint => ErrorBody::new(ErrorCode::UnknownEndpoint),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<MissingFields> for ApiError {
    fn from(e: MissingFields) -> Self {
        ApiError::MissingFields(e)
    }
}

impl From<NotationRequestError> for ApiError {
    fn from(e: NotationRequestError) -> Self {
        match e {
            NotationRequestError::Missing(missing) => ApiError::MissingFields(missing),
            NotationRequestError::Invalid(invalid) => ApiError::InvalidRequest(invalid.to_string()),
        }
    }
}
