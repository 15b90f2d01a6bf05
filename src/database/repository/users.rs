use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::tutor::{Tutor, TutorProfileInput};
use crate::database::models::user::{NewUser, User, UserProfileUpdate};
use crate::middleware::response::PageRequest;
use crate::types::Role;

use super::tutors;

const USER_COLUMNS: &str = "id, email, full_name, phone_number, address, image_url, password_hash, \
     role, is_locked_out, created_at, updated_at";

async fn insert_user(conn: &mut PgConnection, new_user: &NewUser) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, email, full_name, phone_number, address, image_url, password_hash, role)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(new_user.email.trim())
    .bind(&new_user.full_name)
    .bind(&new_user.phone_number)
    .bind(&new_user.address)
    .bind(&new_user.image_url)
    .bind(&new_user.password_hash)
    .bind(new_user.role)
    .fetch_one(conn)
    .await
    .map_err(|e| DatabaseError::on_unique_violation(e, "Email is already registered"))?;
    Ok(user)
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Emails are matched case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        insert_user(&mut *conn, &new_user).await
    }

    /// Create a tutor account and its pending profile together
    pub async fn insert_tutor(
        &self,
        new_user: NewUser,
        profile: &TutorProfileInput,
    ) -> Result<(User, Tutor), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut *tx, &new_user).await?;
        let tutor = tutors::insert_pending(&mut *tx, user.id, profile).await?;
        tx.commit().await?;
        Ok((user, tutor))
    }

    pub async fn update_profile(&self, id: Uuid, update: &UserProfileUpdate) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone_number = COALESCE($3, phone_number),
                address = COALESCE($4, address),
                image_url = COALESCE($5, image_url),
                updated_at = now()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone_number)
        .bind(&update.address)
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_locked(&self, id: Uuid, locked: bool) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_locked_out = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(locked)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Paged listing filtered by name/email substring and role
    pub async fn list(
        &self,
        search: Option<&str>,
        role: Option<Role>,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), DatabaseError> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE ($1::text IS NULL OR full_name ILIKE $1 OR email ILIKE $1)
             AND ($2::text IS NULL OR role = $2)",
        )
        .bind(&pattern)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users
             WHERE ($1::text IS NULL OR full_name ILIKE $1 OR email ILIKE $1)
             AND ($2::text IS NULL OR role = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
            USER_COLUMNS
        ))
        .bind(&pattern)
        .bind(role)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    pub async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DatabaseError> {
        let rows: Vec<(Role, i64)> = sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
