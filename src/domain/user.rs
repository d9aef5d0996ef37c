use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Lifecycle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub team_type: TeamType,
    pub is_active: bool,
    /// `None` means the flag was never set; the default policy is visible.
    pub show_on_leaderboard: Option<bool>,
    pub avatar_filename: Option<String>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum Role {
    Member,
    Reviewer,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum TeamType {
    Main,
    Sub,
}

impl User {
    /// Reviewers and admins may operate the review state machine.
    pub fn can_review(&self) -> bool {
        matches!(self.role, Role::Reviewer | Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Absence of the flag means visible.
    pub fn is_visible_on_leaderboard(&self) -> bool {
        self.show_on_leaderboard.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Role,
    pub team_type: TeamType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub team_type: Option<TeamType>,
    pub is_active: Option<bool>,
    pub show_on_leaderboard: Option<bool>,
    pub avatar_filename: Option<String>,
}
