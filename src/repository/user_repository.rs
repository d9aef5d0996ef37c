use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateUserRequest, Lifecycle, Role, TeamType, UpdateUserRequest, User},
    error::{AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: Option<String>,
    role: String,
    team_type: String,
    is_active: i32,
    show_on_leaderboard: Option<i32>,
    avatar_filename: Option<String>,
    lifecycle: String,
    created_at: NaiveDateTime,
}

const USER_COLUMNS: &str = "id, username, email, role, team_type, is_active, \
     show_on_leaderboard, avatar_filename, lifecycle, created_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            username: row.username,
            email: row.email,
            role: parse_role(&row.role)?,
            team_type: parse_team_type(&row.team_type)?,
            is_active: row.is_active != 0,
            show_on_leaderboard: row.show_on_leaderboard.map(|v| v != 0),
            avatar_filename: row.avatar_filename,
            lifecycle: parse_lifecycle(&row.lifecycle)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

pub(crate) fn parse_role(s: &str) -> Result<Role> {
    match s {
        "Member" => Ok(Role::Member),
        "Reviewer" => Ok(Role::Reviewer),
        "Admin" => Ok(Role::Admin),
        _ => Err(AppError::Database(format!("Invalid role: {}", s))),
    }
}

pub(crate) fn role_to_str(role: &Role) -> &'static str {
    match role {
        Role::Member => "Member",
        Role::Reviewer => "Reviewer",
        Role::Admin => "Admin",
    }
}

pub(crate) fn parse_team_type(s: &str) -> Result<TeamType> {
    match s {
        "Main" => Ok(TeamType::Main),
        "Sub" => Ok(TeamType::Sub),
        _ => Err(AppError::Database(format!("Invalid team type: {}", s))),
    }
}

pub(crate) fn team_type_to_str(team_type: &TeamType) -> &'static str {
    match team_type {
        TeamType::Main => "Main",
        TeamType::Sub => "Sub",
    }
}

pub(crate) fn parse_lifecycle(s: &str) -> Result<Lifecycle> {
    match s {
        "Active" => Ok(Lifecycle::Active),
        "Deleted" => Ok(Lifecycle::Deleted),
        _ => Err(AppError::Database(format!("Invalid lifecycle: {}", s))),
    }
}

pub(crate) fn lifecycle_to_str(lifecycle: &Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Active => "Active",
        Lifecycle::Deleted => "Deleted",
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, request: CreateUserRequest, password_hash: &str) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let id_str = id.to_string();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, email, role, team_type,
                is_active, lifecycle, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 1, 'Active', ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.username)
        .bind(password_hash)
        .bind(&request.email)
        .bind(role_to_str(&request.role))
        .bind(team_type_to_str(&request.team_type))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    async fn password_hash_by_username(&self, username: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = ? AND lifecycle = 'Active'",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE (? OR lifecycle = 'Active') ORDER BY username ASC",
            USER_COLUMNS
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let role_str = role_to_str(update.role.as_ref().unwrap_or(&existing.role));
        let team_type_str =
            team_type_to_str(update.team_type.as_ref().unwrap_or(&existing.team_type));
        let is_active = update.is_active.unwrap_or(existing.is_active) as i32;
        let show_on_leaderboard = update
            .show_on_leaderboard
            .or(existing.show_on_leaderboard)
            .map(|b| b as i32);

        sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                role = ?,
                team_type = ?,
                is_active = ?,
                show_on_leaderboard = ?,
                avatar_filename = COALESCE(?, avatar_filename)
            WHERE id = ?
            "#,
        )
        .bind(&update.email)
        .bind(role_str)
        .bind(team_type_str)
        .bind(is_active)
        .bind(show_on_leaderboard)
        .bind(&update.avatar_filename)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated user".to_string()))
    }

    async fn set_lifecycle(&self, id: Uuid, lifecycle: Lifecycle) -> Result<()> {
        sqlx::query("UPDATE users SET lifecycle = ? WHERE id = ?")
            .bind(lifecycle_to_str(&lifecycle))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        // Deletion order is explicit: items, submissions, then the
        // references that merely point at the user.
        sqlx::query(
            "DELETE FROM submission_items WHERE submission_id IN \
             (SELECT id FROM submissions WHERE user_id = ?)",
        )
        .bind(&id_str)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM submissions WHERE user_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE point_adjustments SET created_by = NULL WHERE created_by = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM point_adjustments WHERE user_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM notifications WHERE user_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
