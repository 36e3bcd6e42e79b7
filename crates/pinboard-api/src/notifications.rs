use axum::{Extension, Json, extract::State, response::IntoResponse};

use pinboard_types::api::{Claims, NotificationListResponse, UnreadCountResponse};

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let count = blocking(&state, move |board| board.count_unread(claims.sub)).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = blocking(&state, move |board| board.build_feed(claims.sub)).await?;
    Ok(Json(NotificationListResponse { notifications }))
}
