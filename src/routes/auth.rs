/// Authentication Routes
///
/// Login, access token refresh, and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::error::{AppError, ErrorContext};
use crate::routes::users::UserResponse;
use crate::state::AppState;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate with email and password. Returns the user together with a
/// one-hour access token and a sixty-day refresh token.
///
/// # Errors
/// - 401: Invalid credentials (same response for unknown email and wrong password)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user = state.users.find_by_email(form.email.trim()).await?;
    let credential = user.as_ref().map(|u| Credential {
        identity_id: u.id,
        password_hash: u.password_hash.clone(),
    });

    let tokens = state
        .sessions
        .login(credential, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    // `login` only succeeds when a credential was present.
    let user = user.ok_or_else(|| AppError::Internal("login succeeded without a user".to_string()))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(user),
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchange the refresh token in `Authorization: Bearer <token>` for a new
/// access token. The refresh token stays valid.
///
/// # Errors
/// - 401: Missing/malformed header, or unknown, revoked, or expired token
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = state.sessions.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the refresh token in `Authorization: Bearer <token>`.
///
/// # Errors
/// - 401: Missing or malformed header
/// - 404: Unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.sessions.revoke(req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}
