/// Chirp Routes
///
/// Reading is public. Creating and deleting require an access token, and
/// deleting additionally requires owning the chirp.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::ensure_owner;
use crate::error::{AppError, StoreError, ValidationError};
use crate::state::AppState;
use crate::store::SortOrder;
use crate::validators::validate_chirp;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| ValidationError::InvalidFormat("chirp id".to_string()).into())
}

/// POST /api/chirps
///
/// The author is the access token's subject.
pub async fn create_chirp(
    req: HttpRequest,
    form: web::Json<CreateChirpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = state.sessions.authorize(req.headers())?;

    let body = validate_chirp(&form.body)?;
    let chirp = state.chirps.create(user_id, &body).await?;

    tracing::info!(user_id = %user_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirps = state.chirps.list(query.author_id, query.sort).await?;

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = state
        .chirps
        .get(chirp_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: Chirp belongs to someone else
/// - 404: No such chirp
pub async fn delete_chirp(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = state.sessions.authorize(req.headers())?;
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = state
        .chirps
        .get(chirp_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("chirp".to_string()))?;

    ensure_owner(user_id, chirp.user_id)?;

    state.chirps.delete(chirp_id).await?;

    tracing::info!(user_id = %user_id, chirp_id = %chirp_id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
