//! Authentication endpoints: login, signup, and the post-auth callback.
//!
//! Login and signup pass the rate limiter (keyed by client origin)
//! before the identity provider is ever touched. Login answers every
//! credential failure with one generic message so callers cannot
//! enumerate accounts; signup maps known provider categories to stable,
//! user-facing strings.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use forkline_guard::{CredentialError, RateLimitRule, safe_redirect};
use forkline_types::{ForklineError, Role, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, client_error};
use crate::extract::{SESSION_COOKIE, client_key};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
}

const GENERIC_LOGIN_ERROR: &str = "invalid email or password";

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    state
        .limiter
        .enforce(&RateLimitRule::LOGIN, &client_key(&headers))
        .await?;

    match state.provider.login(&body.email, &body.password).await {
        Ok(session) => Ok(Json(SessionResponse {
            token: session.token,
            user_id: session.identity.user_id,
            role: session.identity.role,
        })
        .into_response()),
        Err(err) => {
            // One category on the wire, full detail in the log.
            debug!(error = %err, "login rejected");
            Ok(client_error(StatusCode::UNAUTHORIZED, GENERIC_LOGIN_ERROR))
        }
    }
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CredentialsBody>,
) -> Result<Response, ApiError> {
    state
        .limiter
        .enforce(&RateLimitRule::SIGNUP, &client_key(&headers))
        .await?;

    match state.provider.signup(&body.email, &body.password).await {
        Ok(session) => Ok((
            StatusCode::CREATED,
            Json(SessionResponse {
                token: session.token,
                user_id: session.identity.user_id,
                role: session.identity.role,
            }),
        )
            .into_response()),
        Err(err) => Ok(signup_failure(&err)),
    }
}

/// Stable user-facing messages per provider failure category.
fn signup_failure(err: &CredentialError) -> Response {
    let status = match err {
        CredentialError::MalformedEmail => StatusCode::BAD_REQUEST,
        CredentialError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        CredentialError::DuplicateAccount => StatusCode::CONFLICT,
        CredentialError::ProviderRateLimited => StatusCode::TOO_MANY_REQUESTS,
        CredentialError::Unavailable(detail) => {
            warn!(detail = %detail, "identity provider unavailable during signup");
            return client_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
        CredentialError::InvalidCredentials | CredentialError::InvalidCode => {
            StatusCode::BAD_REQUEST
        }
    };
    client_error(status, &err.to_string())
}

/// Exchange an authorization code for a session, then redirect to the
/// validated `next` path.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let code = params
        .code
        .as_deref()
        .ok_or_else(|| ForklineError::invalid_input("missing authorization code"))?;

    let session = match state.provider.exchange_code(code).await {
        Ok(session) => session,
        Err(err) => {
            debug!(error = %err, "code exchange rejected");
            return Ok(client_error(
                StatusCode::UNAUTHORIZED,
                "invalid or expired code",
            ));
        }
    };

    let destination = safe_redirect(params.next.as_deref());
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        session.token
    );

    let mut response = (StatusCode::SEE_OTHER, ()).into_response();
    response.headers_mut().insert(
        header::LOCATION,
        HeaderValue::from_str(destination)
            .map_err(|_| ForklineError::Internal("redirect target not header-safe".into()))?,
    );
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|_| ForklineError::Internal("session cookie not header-safe".into()))?,
    );
    Ok(response)
}
