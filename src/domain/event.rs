use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How participants join an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Organisers collect name, phone and company for each participant
    CollectInfo,
    /// Participants are entered as a plain list of names
    EnterNames,
}

impl EventKind {
    pub const ALLOWED: &'static [&'static str] = &["collect_info", "enter_names"];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CollectInfo => "collect_info",
            EventKind::EnterNames => "enter_names",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect_info" => Ok(EventKind::CollectInfo),
            "enter_names" => Ok(EventKind::EnterNames),
            other => Err(format!("Unknown event type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub short_name: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub short_name: String,
    pub kind: EventKind,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub created_by: Uuid,
}

/// Lowercase, trim, and collapse whitespace runs into single dashes.
pub fn normalize_short_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
