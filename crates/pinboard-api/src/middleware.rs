use axum::{
    RequestExt,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use tracing::debug;

use pinboard_core::CoreError;

use crate::auth::{AppState, decode_token};
use crate::error::ApiError;

/// Extract and validate the bearer JWT, then expose its claims to handlers
/// as `Extension<Claims>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = req
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| ApiError(CoreError::Unauthenticated))?;

    let claims = decode_token(&state.jwt_secret, bearer.token()).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError(CoreError::Unauthenticated)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
