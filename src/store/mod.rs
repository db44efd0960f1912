use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Event, Ticket, User};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

/// Result of an atomic booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    /// Fewer seats remain than the ticket asks for.
    SoldOut,
    /// The event vanished between lookup and booking.
    EventMissing,
}

/// Persistence port for events, users and tickets.
///
/// `create_booking` is the one compound operation: it reserves seats and
/// writes the ticket atomically, so the seat count can never go negative
/// under concurrent bookings.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, AppError>;
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, AppError>;
    async fn insert_event(&self, event: &Event) -> Result<(), AppError>;
    async fn update_event(&self, event: &Event) -> Result<(), AppError>;
    async fn delete_event(&self, id: Uuid) -> Result<(), AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError>;
    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, AppError>;
    async fn all_tickets(&self) -> Result<Vec<Ticket>, AppError>;
    async fn count_tickets_for_event(&self, event_id: Uuid) -> Result<i64, AppError>;

    /// Decrements the event's seat count by the ticket's quantity and
    /// persists the ticket in one atomic step. Events without a seat
    /// count always book.
    async fn create_booking(&self, ticket: &Ticket) -> Result<BookingOutcome, AppError>;
}
