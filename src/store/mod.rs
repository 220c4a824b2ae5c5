/// Storage layer
///
/// Repository traits consumed by the auth core and the route handlers, with a
/// Postgres implementation for production and an in-memory one for tests.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Event, NewEvent, NewParticipant, NewUser, Participant, ParticipantChanges, User};
use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lookup by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Fails with `UniqueConstraintViolation` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, DatabaseError>;

    async fn find_by_short_name(&self, short_name: &str) -> Result<Option<Event>, DatabaseError>;

    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<Event>, DatabaseError>;

    /// Overwrites every mutable column; `Ok(None)` when the event is gone
    async fn update(&self, event: Event) -> Result<Option<Event>, DatabaseError>;

    /// Removes the event and its participants; `false` when nothing matched
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn create(&self, participant: NewParticipant) -> Result<Participant, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, DatabaseError>;

    /// Participants of one event, sorted by name
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, DatabaseError>;

    /// Drops every participant of the event and inserts `names` in one step
    async fn replace_for_event(
        &self,
        event_id: Uuid,
        names: Vec<String>,
    ) -> Result<Vec<Participant>, DatabaseError>;

    async fn update(
        &self,
        id: Uuid,
        changes: ParticipantChanges,
    ) -> Result<Option<Participant>, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// Store handles injected into the application
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub participants: Arc<dyn ParticipantRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PostgresStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::default()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + EventRepository + ParticipantRepository + 'static,
    {
        Self {
            users: store.clone(),
            events: store.clone(),
            participants: store,
        }
    }
}
