use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::extract::{require_admin, AuthUser};
use crate::models::{Event, EventInput};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::MessageResponse;

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.events.list().await?))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.get(id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    require_admin(&user)?;
    let event = state.events.create(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<EventInput>,
) -> Result<Json<Event>, AppError> {
    require_admin(&user)?;
    Ok(Json(state.events.update(id, input).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&user)?;
    state.events.delete(id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
