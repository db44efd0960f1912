use axum::extract::State;
use axum::Json;

use crate::extract::AuthUser;
use crate::models::PublicUser;
use crate::services::auth::{AuthResponse, LoginRequest, SignupRequest};
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(state.auth.signup(request).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(state.auth.login(request).await?))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}
