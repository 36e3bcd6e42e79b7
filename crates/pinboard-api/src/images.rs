use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use pinboard_core::store::ImageWithOwner;
use pinboard_types::api::{
    Claims, CreateImageRequest, ImageListResponse, ImageResponse, MessageResponse,
    UpdateImageRequest,
};
use pinboard_types::models::UNKNOWN_NICKNAME;

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

pub async fn list_images(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ImageQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(200);
    let images = blocking(&state, move |board| board.recent_images(limit)).await?;

    Ok(Json(ImageListResponse {
        images: images.into_iter().map(image_response).collect(),
    }))
}

pub async fn get_image(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let image = blocking(&state, move |board| board.get_image(id)).await?;
    Ok(Json(image_response(image)))
}

pub async fn create_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateImageRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let image = blocking(&state, move |board| {
        board.create_image(
            claims.sub,
            &req.title,
            req.description.as_deref(),
            &req.file_ref,
        )
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(image_response(ImageWithOwner {
            image,
            owner_username: Some(claims.username),
        })),
    ))
}

pub async fn update_image(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateImageRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let image = blocking(&state, move |board| {
        board.update_image(
            id,
            claims.sub,
            req.title.as_deref(),
            req.description.as_deref(),
        )
    })
    .await?;

    Ok(Json(image_response(ImageWithOwner {
        image,
        owner_username: Some(claims.username),
    })))
}

pub async fn delete_image(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |board| board.delete_image(id, claims.sub)).await?;
    Ok(Json(MessageResponse::new("image deleted")))
}

fn image_response(item: ImageWithOwner) -> ImageResponse {
    let image = item.image;
    ImageResponse {
        id: image.id,
        title: image.title,
        description: image.description,
        file_ref: image.file_ref,
        user_id: image.owner_id,
        username: item
            .owner_username
            .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string()),
        created_at: image.created_at,
        updated_at: image.updated_at,
    }
}
