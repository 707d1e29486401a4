use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::MensGroupMember;

use crate::storage::DbConnection;

const COLUMNS: &str = "id, name, email, phone, join_date, is_active, role, notes";

#[derive(Clone)]
pub struct MensGroupRepository {
    db: DbConnection,
}

impl MensGroupRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, member: &MensGroupMember) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO mens_group_members (name, email, phone, join_date, is_active, role, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.join_date)
        .bind(member.is_active)
        .bind(&member.role)
        .bind(&member.notes)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<MensGroupMember>> {
        let row = sqlx::query(&format!("SELECT {} FROM mens_group_members WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(map_member))
    }

    pub async fn list(&self, include_inactive: bool) -> sqlx::Result<Vec<MensGroupMember>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM mens_group_members WHERE is_active = 1 OR ? ORDER BY name ASC",
            COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_member).collect())
    }

    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM mens_group_members WHERE email = ? AND id != ?")
            .bind(email)
            .bind(except_id.unwrap_or(0))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn update(&self, member: &MensGroupMember) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE mens_group_members
            SET name = ?, email = ?, phone = ?, join_date = ?, is_active = ?, role = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.join_date)
        .bind(member.is_active)
        .bind(&member.role)
        .bind(&member.notes)
        .bind(member.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE mens_group_members SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_active(&self) -> sqlx::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM mens_group_members WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }
}

fn map_member(row: &SqliteRow) -> MensGroupMember {
    MensGroupMember {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        join_date: row.get("join_date"),
        is_active: row.get("is_active"),
        role: row.get("role"),
        notes: row.get("notes"),
    }
}
