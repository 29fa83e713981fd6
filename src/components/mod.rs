// Collaborators around the invitation core
pub mod delivery;
pub mod generation;
#[cfg(feature = "rsvp")]
pub mod redis_service;
pub mod remembered;
pub mod rsvp;

pub use delivery::{select_strategy, Delivery, DeliveryStrategy};
pub use generation::GenerationClient;
pub use remembered::{RememberedAttendee, RememberedStore};
pub use rsvp::{InMemoryRsvpStore, RsvpStore};
