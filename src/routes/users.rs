/// Account Routes
///
/// Registration and credential updates. Password hashes never leave the
/// server.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{AppError, ErrorContext};
use crate::state::AppState;
use crate::store::User;
use crate::validators::{is_valid_email, is_valid_password};

/// Registration and update request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let password_hash = hash_password(&form.password)?;

    let user = state.users.create(&email, &password_hash).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 400: Invalid email or password
/// - 409: Email taken by another user
pub async fn update_user(
    req: HttpRequest,
    form: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = state.sessions.authorize(req.headers())?;
    let context = ErrorContext::new("user_update").with_user_id(user_id);

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let password_hash = hash_password(&form.password)?;

    let user = state
        .users
        .update_credentials(user_id, &email, &password_hash)
        .await?;

    tracing::info!(request_id = %context.request_id, user_id = %user.id, "User updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
