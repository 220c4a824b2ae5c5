//! Domain records shared by the auth core, the stores and the route handlers.

mod event;
mod participant;
mod user;

pub use event::{normalize_short_name, Event, EventKind, NewEvent};
pub use participant::{
    NewParticipant, Participant, ParticipantChanges, ParticipantContact, ParticipantName,
};
pub use user::{normalize_email, NewUser, User, UserProfile, UserRole};
