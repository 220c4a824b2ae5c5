/// In-memory repositories
///
/// Mirrors the Postgres uniqueness and cascade rules so the HTTP layer can be
/// exercised without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Event, NewEvent, NewParticipant, NewUser, Participant, ParticipantChanges, User,
};
use crate::error::DatabaseError;
use crate::store::{EventRepository, ParticipantRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    participants: HashMap<Uuid, Participant>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DatabaseError> {
        self.tables
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("in-memory store lock poisoned".to_string()))
    }
}

fn sorted_by_name(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    participants
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create(&self, event: NewEvent) -> Result<Event, DatabaseError> {
        let mut tables = self.lock()?;
        if tables.events.values().any(|e| e.short_name == event.short_name) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "events_short_name_key".to_string(),
            ));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: event.name,
            short_name: event.short_name,
            kind: event.kind,
            logo_url: event.logo_url,
            background_url: event.background_url,
            created_by: event.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, DatabaseError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn find_by_short_name(&self, short_name: &str) -> Result<Option<Event>, DatabaseError> {
        let tables = self.lock()?;
        Ok(tables
            .events
            .values()
            .find(|e| e.short_name == short_name)
            .cloned())
    }

    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<Event>, DatabaseError> {
        let tables = self.lock()?;
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.created_by == user_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn update(&self, mut event: Event) -> Result<Option<Event>, DatabaseError> {
        let mut tables = self.lock()?;
        if !tables.events.contains_key(&event.id) {
            return Ok(None);
        }
        if tables
            .events
            .values()
            .any(|e| e.id != event.id && e.short_name == event.short_name)
        {
            return Err(DatabaseError::UniqueConstraintViolation(
                "events_short_name_key".to_string(),
            ));
        }

        event.updated_at = Utc::now();
        tables.events.insert(event.id, event.clone());
        Ok(Some(event))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.lock()?;
        if tables.events.remove(&id).is_none() {
            return Ok(false);
        }
        tables.participants.retain(|_, p| p.event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryStore {
    async fn create(&self, participant: NewParticipant) -> Result<Participant, DatabaseError> {
        let mut tables = self.lock()?;
        if !tables.events.contains_key(&participant.event_id) {
            return Err(DatabaseError::QueryExecution(
                "participants_event_id_fkey".to_string(),
            ));
        }

        let now = Utc::now();
        let participant = Participant {
            id: Uuid::new_v4(),
            name: participant.name,
            phone: participant.phone,
            company: participant.company,
            event_id: participant.event_id,
            created_at: now,
            updated_at: now,
        };
        tables.participants.insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, DatabaseError> {
        Ok(self.lock()?.participants.get(&id).cloned())
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        let tables = self.lock()?;
        let participants = tables
            .participants
            .values()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect();
        Ok(sorted_by_name(participants))
    }

    async fn replace_for_event(
        &self,
        event_id: Uuid,
        names: Vec<String>,
    ) -> Result<Vec<Participant>, DatabaseError> {
        let mut tables = self.lock()?;
        tables.participants.retain(|_, p| p.event_id != event_id);

        let now = Utc::now();
        let inserted: Vec<Participant> = names
            .into_iter()
            .map(|name| Participant {
                id: Uuid::new_v4(),
                name,
                phone: None,
                company: None,
                event_id,
                created_at: now,
                updated_at: now,
            })
            .collect();
        for participant in &inserted {
            tables.participants.insert(participant.id, participant.clone());
        }
        Ok(inserted)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ParticipantChanges,
    ) -> Result<Option<Participant>, DatabaseError> {
        let mut tables = self.lock()?;
        Ok(tables.participants.get_mut(&id).map(|participant| {
            participant.apply(changes);
            participant.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.lock()?.participants.remove(&id).is_some())
    }
}
