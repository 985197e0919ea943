/// Admin Routes
///
/// Hit counter page and the development-only data reset.

use actix_web::{web, HttpResponse};

use crate::error::{AppError, AuthError};
use crate::metrics::HitCounter;
use crate::state::AppState;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let page = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits.count()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

/// POST /admin/reset
///
/// Deletes every user, chirp, and refresh token and zeroes the hit counter.
///
/// # Errors
/// - 403: Platform is not `dev`
pub async fn reset(
    state: web::Data<AppState>,
    hits: web::Data<HitCounter>,
) -> Result<HttpResponse, AppError> {
    if !state.is_dev {
        tracing::warn!("Reset attempted outside the dev platform");
        return Err(AuthError::Forbidden.into());
    }

    state.sessions.store().reset_all().await?;
    state.chirps.reset_all().await?;
    state.users.reset_all().await?;
    hits.reset();

    tracing::info!("All data reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and database reset"))
}
