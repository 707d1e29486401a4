use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use shared::{PreRegistration, PRE_REGISTRATION_ENROLLED, PRE_REGISTRATION_PENDING};

use crate::storage::DbConnection;

const COLUMNS: &str = r#"
    id, name, email, phone, birth_date, parent_name, parent_email, parent_phone, address,
    neighborhood, city, state, zip_code, instrument, level, preferred_class_type,
    preferred_schedule, has_musical_experience, musical_experience, questions,
    pre_registration_date, status, contact_date, admin_notes, is_processed
"#;

/// Repository for public music school pre-registrations
#[derive(Clone)]
pub struct PreRegistrationRepository {
    db: DbConnection,
}

impl PreRegistrationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, pre: &PreRegistration) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO music_school_pre_registrations (
                name, email, phone, birth_date, parent_name, parent_email, parent_phone, address,
                neighborhood, city, state, zip_code, instrument, level, preferred_class_type,
                preferred_schedule, has_musical_experience, musical_experience, questions,
                pre_registration_date, status, contact_date, admin_notes, is_processed
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pre.name)
        .bind(&pre.email)
        .bind(&pre.phone)
        .bind(pre.birth_date)
        .bind(&pre.parent_name)
        .bind(&pre.parent_email)
        .bind(&pre.parent_phone)
        .bind(&pre.address)
        .bind(&pre.neighborhood)
        .bind(&pre.city)
        .bind(&pre.state)
        .bind(&pre.zip_code)
        .bind(&pre.instrument)
        .bind(&pre.level)
        .bind(&pre.preferred_class_type)
        .bind(&pre.preferred_schedule)
        .bind(pre.has_musical_experience)
        .bind(&pre.musical_experience)
        .bind(&pre.questions)
        .bind(pre.pre_registration_date)
        .bind(&pre.status)
        .bind(pre.contact_date)
        .bind(&pre.admin_notes)
        .bind(pre.is_processed)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<PreRegistration>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM music_school_pre_registrations WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(map_pre_registration))
    }

    /// Newest first
    pub async fn list(&self) -> sqlx::Result<Vec<PreRegistration>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM music_school_pre_registrations ORDER BY pre_registration_date DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_pre_registration).collect())
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: &str,
        admin_notes: Option<&str>,
        is_processed: bool,
        contact_date: Option<DateTime<Utc>>,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE music_school_pre_registrations
            SET status = ?, admin_notes = ?, is_processed = ?, contact_date = ?
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(admin_notes)
        .bind(is_processed)
        .bind(contact_date)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks the row enrolled and processed inside the conversion transaction
    pub async fn mark_enrolled_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE music_school_pre_registrations SET status = ?, is_processed = 1 WHERE id = ?",
        )
        .bind(PRE_REGISTRATION_ENROLLED)
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_pending(&self) -> sqlx::Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM music_school_pre_registrations WHERE status = ?",
        )
        .bind(PRE_REGISTRATION_PENDING)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.get("total"))
    }
}

fn map_pre_registration(row: &SqliteRow) -> PreRegistration {
    PreRegistration {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        birth_date: row.get("birth_date"),
        parent_name: row.get("parent_name"),
        parent_email: row.get("parent_email"),
        parent_phone: row.get("parent_phone"),
        address: row.get("address"),
        neighborhood: row.get("neighborhood"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        instrument: row.get("instrument"),
        level: row.get("level"),
        preferred_class_type: row.get("preferred_class_type"),
        preferred_schedule: row.get("preferred_schedule"),
        has_musical_experience: row.get("has_musical_experience"),
        musical_experience: row.get("musical_experience"),
        questions: row.get("questions"),
        pre_registration_date: row.get("pre_registration_date"),
        status: row.get("status"),
        contact_date: row.get("contact_date"),
        admin_notes: row.get("admin_notes"),
        is_processed: row.get("is_processed"),
    }
}
