use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

pub mod auth;
pub mod events;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthPayload {
        status: "ok",
        service: "event-registration-api",
    })
}
