use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Event, EventInput};
use crate::store::Store;
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn Store>,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Event>, AppError> {
        self.store.list_events().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, AppError> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event not found with id: {id}")))
    }

    pub async fn create(&self, input: EventInput) -> Result<Event, AppError> {
        let date = input.validate()?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            date,
            location: input.location,
            available_seats: input.available_seats,
            ticket_price: input.ticket_price,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_event(&event).await?;
        tracing::info!(event_id = %event.id, name = %event.name, "Event created");
        Ok(event)
    }

    /// Full replace of all mutable fields; `created_at` is kept.
    pub async fn update(&self, id: Uuid, input: EventInput) -> Result<Event, AppError> {
        let date = input.validate()?;
        let existing = self.get(id).await?;

        let event = Event {
            id: existing.id,
            name: input.name,
            description: input.description,
            date,
            location: input.location,
            available_seats: input.available_seats,
            ticket_price: input.ticket_price,
            image_url: input.image_url,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.store.update_event(&event).await?;
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let event = self.get(id).await?;

        let booked = self.store.count_tickets_for_event(id).await?;
        if booked > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete event with existing bookings. This event has {booked} ticket(s) booked."
            )));
        }

        self.store.delete_event(event.id).await?;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }
}
