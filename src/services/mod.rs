pub mod auth;
pub mod events;
pub mod tickets;

pub use auth::AuthService;
pub use events::EventCatalog;
pub use tickets::BookingEngine;
