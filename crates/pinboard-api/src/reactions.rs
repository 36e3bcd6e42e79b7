use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use pinboard_types::api::{
    Claims, ReactionListResponse, ToggleReactionRequest, ToggleReactionResponse,
};
use pinboard_types::models::ReactionAction;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_reactions(
    State(state): State<AppState>,
    WithRejection(Path(image_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let reactions = blocking(&state, move |board| board.reaction_summary(image_id)).await?;
    Ok(Json(ReactionListResponse { reactions }))
}

/// 201 when the reaction was added, 200 when it was removed.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<ToggleReactionRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let action = blocking(&state, move |board| {
        board.toggle_reaction(req.image_id, claims.sub, &req.emoji)
    })
    .await?;

    let status = match action {
        ReactionAction::Added => StatusCode::CREATED,
        ReactionAction::Removed => StatusCode::OK,
    };
    Ok((status, Json(ToggleReactionResponse { action })))
}
