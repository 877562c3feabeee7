use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

use shared_models::actor::{Actor, ActorRole};
use shared_models::error::AppError;

/// Middleware resolving the acting identity from explicit headers. Every
/// mutating route runs behind this; handlers read the resulting
/// `Extension<Actor>` instead of any ambient session state.
pub async fn actor_middleware(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let actor = actor_from_headers(&request)?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn actor_from_headers(request: &Request<Body>) -> Result<Actor, AppError> {
    let id_header = request
        .headers()
        .get("x-actor-id")
        .ok_or_else(|| AppError::BadRequest("Missing x-actor-id header".to_string()))?;
    let role_header = request
        .headers()
        .get("x-actor-role")
        .ok_or_else(|| AppError::BadRequest("Missing x-actor-role header".to_string()))?;

    let id: Uuid = id_header
        .to_str()
        .ok()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::BadRequest("x-actor-id is not a valid uuid".to_string()))?;

    let role: ActorRole = role_header
        .to_str()
        .ok()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| {
            AppError::BadRequest("x-actor-role must be 'patient' or 'doctor'".to_string())
        })?;

    Ok(Actor { id, role })
}
