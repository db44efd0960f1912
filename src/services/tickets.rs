use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{BookingStatus, Ticket, TicketBookingRequest, TicketResponse, User};
use crate::store::{BookingOutcome, Store};
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn Store>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Books tickets for the caller. The attendee may be a third party;
    /// the ticket is still owned by the authenticated caller.
    pub async fn book(
        &self,
        caller: &User,
        request: TicketBookingRequest,
    ) -> Result<Ticket, AppError> {
        request.validate()?;

        let event = self
            .store
            .get_event(request.event_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Event not found with id: {}", request.event_id))
            })?;

        let total_amount = event
            .ticket_price
            .map(|price| price * Decimal::from(request.number_of_tickets));

        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: caller.id,
            event_id: event.id,
            attendee_name: request.attendee_name,
            attendee_email: request.attendee_email,
            phone_number: request.phone_number,
            number_of_tickets: request.number_of_tickets,
            total_amount,
            booking_status: BookingStatus::Confirmed,
            booking_date: Utc::now(),
        };

        // Seat check and decrement happen atomically in the store
        match self.store.create_booking(&ticket).await? {
            BookingOutcome::Booked => {}
            BookingOutcome::SoldOut => {
                return Err(AppError::Validation("Not enough seats available".into()));
            }
            BookingOutcome::EventMissing => {
                return Err(AppError::NotFound(format!(
                    "Event not found with id: {}",
                    event.id
                )));
            }
        }

        tracing::info!(
            ticket_id = %ticket.id,
            event_id = %event.id,
            count = ticket.number_of_tickets,
            "Ticket booked"
        );
        Ok(ticket)
    }

    /// Fetches one ticket; only its owner or an admin may see it.
    pub async fn get_ticket(&self, caller: &User, id: Uuid) -> Result<TicketResponse, AppError> {
        let ticket = self
            .store
            .get_ticket(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket not found with id: {id}")))?;

        if ticket.user_id != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden("Access denied".into()));
        }

        self.flatten(ticket).await
    }

    pub async fn user_tickets(&self, caller: &User) -> Result<Vec<TicketResponse>, AppError> {
        let tickets = self.store.tickets_for_user(caller.id).await?;
        let mut responses = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            responses.push(self.flatten(ticket).await?);
        }
        Ok(responses)
    }

    /// Admin-only at the route layer.
    pub async fn all_tickets(&self) -> Result<Vec<TicketResponse>, AppError> {
        let tickets = self.store.all_tickets().await?;
        let mut responses = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            responses.push(self.flatten(ticket).await?);
        }
        Ok(responses)
    }

    async fn flatten(&self, ticket: Ticket) -> Result<TicketResponse, AppError> {
        let event = self.store.get_event(ticket.event_id).await?;
        let user = self.store.find_user(ticket.user_id).await?;
        Ok(TicketResponse::from_parts(
            &ticket,
            event.as_ref(),
            user.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::datetime;
    use crate::models::{Event, Role};
    use crate::store::MemStore;

    fn engine() -> (BookingEngine, Arc<MemStore>) {
        let store = Arc::new(MemStore::new());
        (BookingEngine::new(store.clone()), store)
    }

    async fn seed_event(
        store: &MemStore,
        seats: Option<i32>,
        price: Option<Decimal>,
    ) -> Event {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: "RustConf".into(),
            description: "A conference".into(),
            date: datetime::parse_flexible("2024-05-01T09:00:00").unwrap(),
            location: "Berlin".into(),
            available_seats: seats,
            ticket_price: price,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_event(&event).await.unwrap();
        event
    }

    async fn seed_user(store: &MemStore, email: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: "h".into(),
            role,
        };
        store.insert_user(&user).await.unwrap();
        user
    }

    fn booking(event_id: Uuid, count: i32) -> TicketBookingRequest {
        TicketBookingRequest {
            event_id,
            attendee_name: "Grace".into(),
            attendee_email: "grace@example.com".into(),
            phone_number: Some("+123456".into()),
            number_of_tickets: count,
        }
    }

    #[tokio::test]
    async fn booking_computes_total_and_decrements_seats() {
        let (engine, store) = engine();
        let price = "25.5".parse::<Decimal>().unwrap();
        let event = seed_event(&store, Some(10), Some(price)).await;
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        let ticket = engine.book(&user, booking(event.id, 3)).await.unwrap();

        assert_eq!(ticket.total_amount, Some("76.5".parse().unwrap()));
        assert_eq!(ticket.booking_status, BookingStatus::Confirmed);
        assert_eq!(ticket.user_id, user.id);
        let stored = store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, Some(7));
    }

    #[tokio::test]
    async fn free_event_leaves_total_absent() {
        let (engine, store) = engine();
        let event = seed_event(&store, Some(10), None).await;
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        let ticket = engine.book(&user, booking(event.id, 2)).await.unwrap();
        assert_eq!(ticket.total_amount, None);
    }

    #[tokio::test]
    async fn insufficient_seats_fail_without_mutation() {
        let (engine, store) = engine();
        let event = seed_event(&store, Some(2), None).await;
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        let err = engine.book(&user, booking(event.id, 5)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = store.get_event(event.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, Some(2));
        assert!(store.all_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlimited_seating_never_fails_availability() {
        let (engine, store) = engine();
        let event = seed_event(&store, None, None).await;
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        engine.book(&user, booking(event.id, 100_000)).await.unwrap();
    }

    /// Store double whose event disappears between the availability lookup
    /// and the booking write, like a concurrent admin delete would cause.
    struct VanishingEventStore {
        inner: MemStore,
    }

    #[async_trait::async_trait]
    impl Store for VanishingEventStore {
        async fn list_events(&self) -> Result<Vec<Event>, AppError> {
            self.inner.list_events().await
        }
        async fn get_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
            self.inner.get_event(id).await
        }
        async fn insert_event(&self, event: &Event) -> Result<(), AppError> {
            self.inner.insert_event(event).await
        }
        async fn update_event(&self, event: &Event) -> Result<(), AppError> {
            self.inner.update_event(event).await
        }
        async fn delete_event(&self, id: Uuid) -> Result<(), AppError> {
            self.inner.delete_event(id).await
        }
        async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
            self.inner.find_user(id).await
        }
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            self.inner.find_user_by_email(email).await
        }
        async fn insert_user(&self, user: &User) -> Result<(), AppError> {
            self.inner.insert_user(user).await
        }
        async fn get_ticket(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
            self.inner.get_ticket(id).await
        }
        async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, AppError> {
            self.inner.tickets_for_user(user_id).await
        }
        async fn all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
            self.inner.all_tickets().await
        }
        async fn count_tickets_for_event(&self, event_id: Uuid) -> Result<i64, AppError> {
            self.inner.count_tickets_for_event(event_id).await
        }
        async fn create_booking(&self, ticket: &Ticket) -> Result<BookingOutcome, AppError> {
            self.inner.delete_event(ticket.event_id).await?;
            self.inner.create_booking(ticket).await
        }
    }

    #[tokio::test]
    async fn event_deleted_mid_booking_surfaces_as_not_found() {
        let store = Arc::new(VanishingEventStore {
            inner: MemStore::new(),
        });
        let engine = BookingEngine::new(store.clone());
        let event = seed_event(&store.inner, Some(10), None).await;
        let user = seed_user(&store.inner, "ada@example.com", Role::User).await;

        let err = engine.book(&user, booking(event.id, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (engine, store) = engine();
        let user = seed_user(&store, "ada@example.com", Role::User).await;

        let err = engine
            .book(&user, booking(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn ticket_access_is_owner_or_admin_only() {
        let (engine, store) = engine();
        let event = seed_event(&store, Some(10), None).await;
        let owner = seed_user(&store, "owner@example.com", Role::User).await;
        let other = seed_user(&store, "other@example.com", Role::User).await;
        let admin = seed_user(&store, "admin@example.com", Role::Admin).await;

        let ticket = engine.book(&owner, booking(event.id, 1)).await.unwrap();

        assert!(engine.get_ticket(&owner, ticket.id).await.is_ok());
        assert!(engine.get_ticket(&admin, ticket.id).await.is_ok());
        assert!(matches!(
            engine.get_ticket(&other, ticket.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn flattened_response_carries_event_and_user_fields() {
        let (engine, store) = engine();
        let event = seed_event(&store, Some(10), Some(Decimal::from(20))).await;
        let owner = seed_user(&store, "owner@example.com", Role::User).await;

        let ticket = engine.book(&owner, booking(event.id, 2)).await.unwrap();
        let response = engine.get_ticket(&owner, ticket.id).await.unwrap();

        assert_eq!(response.event_name.as_deref(), Some("RustConf"));
        assert_eq!(response.user_email.as_deref(), Some("owner@example.com"));
        assert_eq!(response.total_amount, Some(Decimal::from(40)));
    }

    #[tokio::test]
    async fn user_tickets_lists_only_the_callers() {
        let (engine, store) = engine();
        let event = seed_event(&store, None, None).await;
        let a = seed_user(&store, "a@example.com", Role::User).await;
        let b = seed_user(&store, "b@example.com", Role::User).await;

        engine.book(&a, booking(event.id, 1)).await.unwrap();
        engine.book(&a, booking(event.id, 1)).await.unwrap();
        engine.book(&b, booking(event.id, 1)).await.unwrap();

        assert_eq!(engine.user_tickets(&a).await.unwrap().len(), 2);
        assert_eq!(engine.user_tickets(&b).await.unwrap().len(), 1);
        assert_eq!(engine.all_tickets().await.unwrap().len(), 3);
    }
}
