use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::extract::{require_admin, AuthUser};
use crate::models::{Ticket, TicketBookingRequest, TicketResponse};
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn book_ticket(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<TicketBookingRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = state.bookings.book(&user, request).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    Ok(Json(state.bookings.get_ticket(&user, id).await?))
}

pub async fn my_tickets(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    Ok(Json(state.bookings.user_tickets(&user).await?))
}

pub async fn all_tickets(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    require_admin(&user)?;
    Ok(Json(state.bookings.all_tickets().await?))
}
