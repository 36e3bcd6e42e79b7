use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use pinboard_core::Board;
use pinboard_core::accounts::NewAccount;
use pinboard_db::Database;
use pinboard_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserResponse};
use pinboard_types::models::User;

use crate::error::{ApiError, blocking};

/// Tokens stay valid for a day.
const TOKEN_TTL_HOURS: i64 = 24;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub board: Board<Database>,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |board| {
        board.register(NewAccount {
            username: &req.username,
            nickname: req.nickname.as_deref(),
            email: &req.email,
            password: &req.password,
        })
    })
    .await?;

    let token = create_token(&state.jwt_secret, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user_response(user),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |board| {
        board.authenticate(&req.username, &req.password)
    })
    .await?;

    let token = create_token(&state.jwt_secret, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: user_response(user),
    }))
}

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        nickname: user.nickname,
        email: user.email,
        created_at: user.created_at,
    }
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
