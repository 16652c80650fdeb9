use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entities;

pub const DEFAULT_QUEUE_NAME: &str = "default_queue";
pub const DEFAULT_TARGET_SYSTEM: &str = "default_system";
pub const DEFAULT_PRIORITY: i32 = 1;
pub const DEFAULT_ACTION_TYPE: &str = "enable";
pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGE_LIMIT: u64 = 1000;
/// Largest offset the SQL binders accept (signed 64-bit).
pub const MAX_PAGE_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub lifetime_hours: i32,
    pub disable_all_campaigns: bool,
    pub queue_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub lifetime_hours: i32,
    pub disable_all_campaigns: bool,
    pub queue_name: String,
}

impl NewEvent {
    /// An event with every optional field at its default.
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description: None,
            lifetime_hours: 0,
            disable_all_campaigns: false,
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

/// Fields left as `None` keep their stored value. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub lifetime_hours: Option<i32>,
    pub disable_all_campaigns: Option<bool>,
    pub queue_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub target_system: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub target_system: String,
}

impl NewOffer {
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description: None,
            priority: DEFAULT_PRIORITY,
            target_system: DEFAULT_TARGET_SYSTEM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<i32>,
    pub target_system: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOffer {
    pub event_id: String,
    pub offer_id: String,
    pub delay_minutes: i32,
    pub action_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventOffer {
    pub event_id: String,
    pub offer_id: String,
    pub delay_minutes: i32,
    pub action_type: String,
}

impl NewEventOffer {
    pub fn new(event_id: impl Into<String>, offer_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            offer_id: offer_id.into(),
            delay_minutes: 0,
            action_type: DEFAULT_ACTION_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOfferPatch {
    pub delay_minutes: Option<i32>,
    pub action_type: Option<String>,
}

impl EventOfferPatch {
    pub fn is_empty(&self) -> bool {
        self.delay_minutes.is_none() && self.action_type.is_none()
    }
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Missing limits fall back to [`DEFAULT_PAGE_LIMIT`]; larger ones are capped.
    /// Offsets past [`MAX_PAGE_OFFSET`] are clamped and yield an empty page.
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).min(MAX_PAGE_OFFSET),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl From<entities::events::Model> for Event {
    fn from(m: entities::events::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
            description: m.description,
            lifetime_hours: m.lifetime_hours,
            disable_all_campaigns: m.disable_all_campaigns,
            queue_name: m.queue_name,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<entities::offers::Model> for Offer {
    fn from(m: entities::offers::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
            description: m.description,
            priority: m.priority,
            target_system: m.target_system,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<entities::event_offer::Model> for EventOffer {
    fn from(m: entities::event_offer::Model) -> Self {
        Self {
            event_id: m.event_id,
            offer_id: m.offer_id,
            delay_minutes: m.delay_minutes,
            action_type: m.action_type,
        }
    }
}
