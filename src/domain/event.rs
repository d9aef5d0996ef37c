use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Lifecycle;

/// A scored competition or reproduction round containing challenges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Score multiplier for item-based computation, >= 0. Manual
    /// overrides bypass it.
    pub weight: f64,
    pub is_reproduction: bool,
    pub is_active: bool,
    /// When set, writeup-only submissions (no claimed challenges) are
    /// accepted for this event.
    pub allow_wp_only: bool,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub category: String,
    pub base_score: i64,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub weight: f64,
    pub is_reproduction: bool,
    pub allow_wp_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub weight: Option<f64>,
    pub is_reproduction: Option<bool>,
    pub is_active: Option<bool>,
    pub allow_wp_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChallengeRequest {
    pub name: String,
    pub category: String,
    pub base_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateChallengeRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub base_score: Option<i64>,
}
