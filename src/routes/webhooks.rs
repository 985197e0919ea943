/// Payment Provider Webhooks
///
/// Polka notifies us when a user upgrades to Chirpy Red. Requests carry the
/// shared key in `Authorization: ApiKey <key>`.

use actix_web::{web, HttpRequest, HttpResponse};
use constant_time_eq::constant_time_eq;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::get_api_key;
use crate::error::{AppError, AuthError};
use crate::state::AppState;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: WebhookData,
}

fn api_key_matches(given: &str, expected: &str) -> bool {
    constant_time_eq(given.as_bytes(), expected.as_bytes())
}

/// POST /api/polka/webhooks
///
/// # Errors
/// - 401: Missing, malformed, or wrong API key
/// - 404: Unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Json<PolkaWebhook>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let key = get_api_key(req.headers())?;
    if !api_key_matches(&key, &state.polka_key) {
        tracing::warn!("Webhook rejected: wrong API key");
        return Err(AuthError::Unauthorized.into());
    }

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    state
        .users
        .upgrade_to_chirpy_red(payload.data.user_id)
        .await?;

    tracing::info!(user_id = %payload.data.user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
