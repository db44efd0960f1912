use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{auth, events, health_check, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/tickets/book", post(tickets::book_ticket))
        .route("/api/tickets/my-tickets", get(tickets::my_tickets))
        .route("/api/tickets/:id", get(tickets::get_ticket))
        .route("/api/tickets", get(tickets::all_tickets))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    apply_security_headers(router).layer(create_cors_layer())
}
