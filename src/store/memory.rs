use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Event, Ticket, User};
use crate::store::{BookingOutcome, Store};
use crate::utils::error::AppError;

/// In-memory store backing tests and database-less development runs.
/// One mutex over all three maps keeps `create_booking` trivially atomic.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    users: HashMap<Uuid, User>,
    tickets: HashMap<Uuid, Ticket>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panicked test thread; propagate the data
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemStore {
    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self.lock().events.values().cloned().collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<(), AppError> {
        self.lock().events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<(), AppError> {
        self.lock().events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), AppError> {
        self.lock().events.remove(&id);
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already exists".into()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        Ok(self.lock().tickets.get(&id).cloned())
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, AppError> {
        let mut tickets: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| std::cmp::Reverse(t.booking_date));
        Ok(tickets)
    }

    async fn all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let mut tickets: Vec<Ticket> = self.lock().tickets.values().cloned().collect();
        tickets.sort_by_key(|t| std::cmp::Reverse(t.booking_date));
        Ok(tickets)
    }

    async fn count_tickets_for_event(&self, event_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .count() as i64)
    }

    async fn create_booking(&self, ticket: &Ticket) -> Result<BookingOutcome, AppError> {
        let mut inner = self.lock();
        let Some(event) = inner.events.get_mut(&ticket.event_id) else {
            return Ok(BookingOutcome::EventMissing);
        };
        if let Some(seats) = event.available_seats {
            if seats < ticket.number_of_tickets {
                return Ok(BookingOutcome::SoldOut);
            }
            event.available_seats = Some(seats - ticket.number_of_tickets);
            event.updated_at = Utc::now();
        }
        inner.tickets.insert(ticket.id, ticket.clone());
        Ok(BookingOutcome::Booked)
    }
}
