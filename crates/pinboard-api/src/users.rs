use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use pinboard_types::api::{
    Claims, MessageResponse, MyImageResponse, MyImagesResponse, NicknameResponse,
    ProfileResponse, UpdateNicknameRequest,
};

use crate::auth::{AppState, user_response};
use crate::error::{ApiError, blocking};

pub async fn my_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, image_count) = blocking(&state, move |board| board.profile(claims.sub)).await?;

    Ok(Json(ProfileResponse {
        user: user_response(user),
        image_count,
    }))
}

pub async fn update_nickname(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateNicknameRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let nickname = blocking(&state, move |board| {
        board.update_nickname(claims.sub, &req.nickname)
    })
    .await?;

    Ok(Json(NicknameResponse { nickname }))
}

/// The caller's images with total and unread comment counts.
pub async fn my_images(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |board| board.unread_by_image(claims.sub)).await?;

    let images = rows
        .into_iter()
        .map(|row| MyImageResponse {
            id: row.image.id,
            title: row.image.title,
            description: row.image.description,
            file_ref: row.image.file_ref,
            created_at: row.image.created_at,
            total_comments: row.total_comments,
            unread_comments: row.unread_comments,
        })
        .collect();

    Ok(Json(MyImagesResponse { images }))
}

pub async fn mark_viewed(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |board| board.mark_viewed(id, claims.sub)).await?;
    Ok(Json(MessageResponse::new("marked as viewed")))
}
