use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::{User, ROLE_ADMIN};

use crate::storage::DbConnection;

const COLUMNS: &str = "id, name, email, password_hash, role, created_at, is_active";

/// A user row including the credential, kept inside the backend
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, user: &User, password_hash: &str) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.is_active)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<StoredUser>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    /// Case-insensitive through the column collation
    pub async fn get_by_email(&self, email: &str) -> sqlx::Result<Option<StoredUser>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", COLUMNS))
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    pub async fn list(&self) -> sqlx::Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY name ASC", COLUMNS))
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(|row| map_user(row).user).collect())
    }

    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE email = ? AND id != ?")
            .bind(email)
            .bind(except_id.unwrap_or(0))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn update(&self, user: &User) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ?, role = ?, is_active = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.role)
            .bind(user.is_active)
            .bind(user.id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active admins other than `except_id`
    pub async fn count_active_admins(&self, except_id: Option<i64>) -> sqlx::Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM users WHERE role = ? AND is_active = 1 AND id != ?",
        )
        .bind(ROLE_ADMIN)
        .bind(except_id.unwrap_or(0))
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get("total"))
    }
}

fn map_user(row: &SqliteRow) -> StoredUser {
    StoredUser {
        user: User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            role: row.get("role"),
            created_at: row.get("created_at"),
            is_active: row.get("is_active"),
        },
        password_hash: row.get("password_hash"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(email: &str, role: &str) -> User {
        User {
            id: 0,
            name: "Someone".to_string(),
            email: email.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let repo = UserRepository::new(DbConnection::in_memory().await.unwrap());
        repo.create(&user("Admin@Church.org", ROLE_ADMIN), "hash").await.unwrap();

        let found = repo.get_by_email("admin@church.org").await.unwrap().unwrap();
        assert_eq!(found.user.email, "Admin@Church.org");
        assert_eq!(found.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_unique_violation() {
        let repo = UserRepository::new(DbConnection::in_memory().await.unwrap());
        repo.create(&user("a@church.org", "User"), "h").await.unwrap();
        let err = repo.create(&user("A@CHURCH.ORG", "User"), "h").await.unwrap_err();
        assert!(err.as_database_error().map(|e| e.is_unique_violation()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_count_active_admins_excludes_given_id() {
        let repo = UserRepository::new(DbConnection::in_memory().await.unwrap());
        let id = repo.create(&user("a@church.org", ROLE_ADMIN), "h").await.unwrap();
        assert_eq!(repo.count_active_admins(None).await.unwrap(), 1);
        assert_eq!(repo.count_active_admins(Some(id)).await.unwrap(), 0);
    }
}
