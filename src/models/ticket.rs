use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::user::User;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Pending,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub attendee_name: String,
    pub attendee_email: String,
    pub phone_number: Option<String>,
    pub number_of_tickets: i32,
    pub total_amount: Option<Decimal>,
    pub booking_status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

fn default_ticket_count() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBookingRequest {
    pub event_id: Uuid,
    #[serde(default)]
    pub attendee_name: String,
    #[serde(default)]
    pub attendee_email: String,
    pub phone_number: Option<String>,
    #[serde(default = "default_ticket_count")]
    pub number_of_tickets: i32,
}

impl TicketBookingRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.attendee_name.trim().is_empty() {
            return Err(AppError::Validation("Attendee name is required".into()));
        }
        if self.attendee_email.trim().is_empty() {
            return Err(AppError::Validation("Attendee email is required".into()));
        }
        if self.number_of_tickets < 1 {
            return Err(AppError::Validation(
                "Number of tickets must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Flattened view of a ticket with its event and user details inlined.
/// Relation fields stay `None` when the relation is missing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub attendee_name: String,
    pub attendee_email: String,
    pub phone_number: Option<String>,
    pub number_of_tickets: i32,
    pub total_amount: Option<Decimal>,
    pub booking_status: BookingStatus,
    pub booking_date: DateTime<Utc>,

    pub event_id: Option<Uuid>,
    pub event_name: Option<String>,
    pub event_description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub event_location: Option<String>,
    pub ticket_price: Option<Decimal>,

    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl TicketResponse {
    pub fn from_parts(ticket: &Ticket, event: Option<&Event>, user: Option<&User>) -> Self {
        Self {
            id: ticket.id,
            attendee_name: ticket.attendee_name.clone(),
            attendee_email: ticket.attendee_email.clone(),
            phone_number: ticket.phone_number.clone(),
            number_of_tickets: ticket.number_of_tickets,
            total_amount: ticket.total_amount,
            booking_status: ticket.booking_status,
            booking_date: ticket.booking_date,

            event_id: event.map(|e| e.id),
            event_name: event.map(|e| e.name.clone()),
            event_description: event.map(|e| e.description.clone()),
            event_date: event.map(|e| e.date),
            event_location: event.map(|e| e.location.clone()),
            ticket_price: event.and_then(|e| e.ticket_price),

            user_id: user.map(|u| u.id),
            user_name: user.map(|u| u.name.clone()),
            user_email: user.map(|u| u.email.clone()),
        }
    }
}
