/// Postgres-backed repositories
///
/// Schema lives in `migrations/`. Enum-like columns (`role`, `type`) are plain
/// TEXT and are parsed back into domain enums on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{
    Event, EventKind, NewEvent, NewParticipant, NewUser, Participant, ParticipantChanges, User,
    UserRole,
};
use crate::error::DatabaseError;
use crate::store::{EventRepository, ParticipantRepository, UserRepository};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<UserRole>().map_err(DatabaseError::UnexpectedError)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    short_name: String,
    event_type: String,
    logo_url: Option<String>,
    background_url: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DatabaseError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let kind = row
            .event_type
            .parse::<EventKind>()
            .map_err(DatabaseError::UnexpectedError)?;
        Ok(Event {
            id: row.id,
            name: row.name,
            short_name: row.short_name,
            kind,
            logo_url: row.logo_url,
            background_url: row.background_url,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    id: Uuid,
    name: String,
    phone: Option<String>,
    company: Option<String>,
    event_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            id: row.id,
            name: row.name,
            phone: row.phone,
            company: row.company,
            event_id: row.event_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const EVENT_COLUMNS: &str =
    "id, name, short_name, event_type, logo_url, background_url, created_by, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str = "id, name, phone, company, event_id, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresStore {
    #[tracing::instrument(name = "Fetching user by email", skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(name = "Fetching user by id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(name = "Saving new user", skip(self, user))]
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    #[tracing::instrument(name = "Saving new event", skip(self, event), fields(short_name = %event.short_name))]
    async fn create(&self, event: NewEvent) -> Result<Event, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events
                (id, name, short_name, event_type, logo_url, background_url, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&event.name)
        .bind(&event.short_name)
        .bind(event.kind.as_str())
        .bind(&event.logo_url)
        .bind(&event.background_url)
        .bind(event.created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Event::try_from(row)
    }

    #[tracing::instrument(name = "Fetching event by id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(name = "Fetching event by short name", skip(self))]
    async fn find_by_short_name(&self, short_name: &str) -> Result<Option<Event>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE short_name = $1",
            EVENT_COLUMNS
        ))
        .bind(short_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(name = "Listing events by creator", skip(self))]
    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<Event>, DatabaseError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE created_by = $1 ORDER BY created_at DESC",
            EVENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    #[tracing::instrument(name = "Updating event", skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: Event) -> Result<Option<Event>, DatabaseError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET name = $2, short_name = $3, event_type = $4, logo_url = $5,
                background_url = $6, updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.short_name)
        .bind(event.kind.as_str())
        .bind(&event.logo_url)
        .bind(&event.background_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(name = "Deleting event", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        // participants go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ParticipantRepository for PostgresStore {
    #[tracing::instrument(name = "Saving new participant", skip(self, participant), fields(event_id = %participant.event_id))]
    async fn create(&self, participant: NewParticipant) -> Result<Participant, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            r#"
            INSERT INTO participants (id, name, phone, company, event_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            PARTICIPANT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&participant.name)
        .bind(&participant.phone)
        .bind(&participant.company)
        .bind(participant.event_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(name = "Fetching participant by id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>, DatabaseError> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {} FROM participants WHERE id = $1",
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Participant::from))
    }

    #[tracing::instrument(name = "Listing participants by event", skip(self))]
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Participant>, DatabaseError> {
        let rows = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {} FROM participants WHERE event_id = $1 ORDER BY LOWER(name) ASC, name ASC",
            PARTICIPANT_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }

    #[tracing::instrument(name = "Replacing participants of event", skip(self, names), fields(count = names.len()))]
    async fn replace_for_event(
        &self,
        event_id: Uuid,
        names: Vec<String>,
    ) -> Result<Vec<Participant>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM participants WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut tx)
            .await?;

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(names.len());
        for name in names {
            let row = sqlx::query_as::<_, ParticipantRow>(&format!(
                r#"
                INSERT INTO participants (id, name, phone, company, event_id, created_at, updated_at)
                VALUES ($1, $2, NULL, NULL, $3, $4, $4)
                RETURNING {}
                "#,
                PARTICIPANT_COLUMNS
            ))
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(event_id)
            .bind(now)
            .fetch_one(&mut tx)
            .await?;
            inserted.push(Participant::from(row));
        }

        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(name = "Updating participant", skip(self, changes))]
    async fn update(
        &self,
        id: Uuid,
        changes: ParticipantChanges,
    ) -> Result<Option<Participant>, DatabaseError> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            r#"
            UPDATE participants
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                company = COALESCE($4, company),
                updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.company)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Participant::from))
    }

    #[tracing::instrument(name = "Deleting participant", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
