use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub event_id: Uuid,
}

/// Partial update; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ParticipantChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl Participant {
    pub fn apply(&mut self, changes: ParticipantChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(company) = changes.company {
            self.company = Some(company);
        }
        self.updated_at = Utc::now();
    }
}

/// Name-only projection used by the bulk listing
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantName {
    pub id: Uuid,
    pub name: String,
}

impl From<Participant> for ParticipantName {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

/// Contact projection used by the public short-name listing
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantContact {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl From<Participant> for ParticipantContact {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            name: p.name,
            phone: p.phone,
            company: p.company,
        }
    }
}
