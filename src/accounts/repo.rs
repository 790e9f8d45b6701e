use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::error;

use crate::accounts::errors::{AccountError, AccountResult};
use crate::accounts::repo_types::{NewUser, User, UserRow};

/// Durable home for user accounts. Implementations must reject a second
/// account with the same email as [`AccountError::EmailTaken`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> AccountResult<User>;
    async fn find_by_id(&self, id: i64) -> AccountResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>>;
    /// Returns `false` when no account has `id`.
    async fn update_password(&self, id: i64, password: &str) -> AccountResult<bool>;
    async fn touch_last_login(&self, id: i64, at: OffsetDateTime) -> AccountResult<()>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role, \
     profile_picture, bio, is_active, is_staff, is_superuser, last_login";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(email: &str, e: sqlx::Error) -> AccountError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AccountError::EmailTaken(email.to_string())
        }
        _ => {
            error!(error = %e, "insert user failed");
            AccountError::Store(e)
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> AccountResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password, role,
                               profile_picture, bio, is_active, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(&user.profile_picture)
            .bind(&user.bio)
            .bind(user.is_active)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_insert_error(&user.email, e))?;
        User::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn update_password(&self, id: i64, password: &str) -> AccountResult<bool> {
        let result = sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn touch_last_login(&self, id: i64, at: OffsetDateTime) -> AccountResult<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_unique_insert_failure_maps_to_store_error() {
        let err = map_insert_error("a@clinic.test", sqlx::Error::RowNotFound);
        assert!(matches!(err, AccountError::Store(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn pool_failure_is_not_reported_as_duplicate() {
        let err = map_insert_error("a@clinic.test", sqlx::Error::PoolTimedOut);
        assert!(!matches!(err, AccountError::EmailTaken(_)));
    }
}
