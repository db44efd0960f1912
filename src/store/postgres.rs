use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, Ticket, User};
use crate::store::{BookingOutcome, Store};
use crate::utils::error::AppError;

const EVENT_COLUMNS: &str = "id, name, description, date, location, available_seats, \
                             ticket_price, image_url, created_at, updated_at";
const TICKET_COLUMNS: &str = "id, user_id, event_id, attendee_name, attendee_email, \
                              phone_number, number_of_tickets, total_amount, \
                              booking_status, booking_date";
const USER_COLUMNS: &str = "id, name, email, password_hash, role";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_user_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict("Email already exists".into());
        }
    }
    AppError::Database(e)
}

#[async_trait]
impl Store for PgStore {
    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY date"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO events (id, name, description, date, location, available_seats, \
             ticket_price, image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.available_seats)
        .bind(event.ticket_price)
        .bind(&event.image_url)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE events SET name = $2, description = $3, date = $4, location = $5, \
             available_seats = $6, ticket_price = $7, image_url = $8, updated_at = $9 \
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.available_seats)
        .bind(event.ticket_price)
        .bind(&event.image_url)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .execute(&self.pool)
        .await
        .map_err(map_insert_user_err)?;
        Ok(())
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, AppError> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY booking_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY booking_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn count_tickets_for_event(&self, event_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn create_booking(&self, ticket: &Ticket) -> Result<BookingOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: a NULL seat count means unlimited and is
        // left untouched; otherwise the row only matches while enough
        // seats remain, which closes the check-then-decrement race.
        let reserved = sqlx::query(
            "UPDATE events SET \
               available_seats = CASE WHEN available_seats IS NULL THEN NULL \
                                      ELSE available_seats - $2 END, \
               updated_at = $3 \
             WHERE id = $1 AND (available_seats IS NULL OR available_seats >= $2)",
        )
        .bind(ticket.event_id)
        .bind(ticket.number_of_tickets)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
                    .bind(ticket.event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Ok(if exists {
                BookingOutcome::SoldOut
            } else {
                BookingOutcome::EventMissing
            });
        }

        sqlx::query(
            "INSERT INTO tickets (id, user_id, event_id, attendee_name, attendee_email, \
             phone_number, number_of_tickets, total_amount, booking_status, booking_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(ticket.event_id)
        .bind(&ticket.attendee_name)
        .bind(&ticket.attendee_email)
        .bind(&ticket.phone_number)
        .bind(ticket.number_of_tickets)
        .bind(ticket.total_amount)
        .bind(ticket.booking_status)
        .bind(ticket.booking_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BookingOutcome::Booked)
    }
}
