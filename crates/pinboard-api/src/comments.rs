use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use pinboard_types::api::{
    Claims, CommentListResponse, CommentResponse, CreateCommentRequest, MessageResponse,
};
use pinboard_types::models::UNKNOWN_NICKNAME;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Path(image_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = blocking(&state, move |board| board.comments_for_image(image_id)).await?;

    let comments = comments
        .into_iter()
        .map(|c| CommentResponse {
            id: c.comment.id,
            content: c.comment.content,
            user_id: c.comment.author_id,
            nickname: c
                .author_nickname
                .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string()),
            created_at: c.comment.created_at,
        })
        .collect();

    Ok(Json(CommentListResponse { comments }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = claims.sub;
    let (comment, author) = blocking(&state, move |board| {
        let comment = board.create_comment(req.image_id, author_id, &req.content)?;
        let (author, _) = board.profile(author_id)?;
        Ok((comment, author))
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment.id,
            content: comment.content,
            user_id: comment.author_id,
            nickname: author.nickname,
            created_at: comment.created_at,
        }),
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |board| board.delete_comment(id, claims.sub)).await?;
    Ok(Json(MessageResponse::new("comment deleted")))
}
