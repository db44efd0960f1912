pub mod datetime;
pub mod event;
pub mod ticket;
pub mod user;

pub use event::{Event, EventInput};
pub use ticket::{BookingStatus, Ticket, TicketBookingRequest, TicketResponse};
pub use user::{PublicUser, Role, User};
