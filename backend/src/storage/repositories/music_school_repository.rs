use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use shared::{MusicSchoolStudent, PAYMENT_STATUS_UP_TO_DATE};

use crate::storage::DbConnection;

const COLUMNS: &str = r#"
    id, name, email, phone, birth_date, parent_name, parent_phone, instrument, level, teacher,
    class_type, class_schedule, monthly_fee, payment_status, last_payment_date, enrollment_date,
    is_active, status, notes, progress, total_classes, attended_classes
"#;

/// Repository for music school students
#[derive(Clone)]
pub struct MusicSchoolRepository {
    db: DbConnection,
}

impl MusicSchoolRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, student: &MusicSchoolStudent) -> sqlx::Result<i64> {
        let mut conn = self.db.pool().acquire().await?;
        insert(&mut conn, student).await
    }

    /// Insert inside a caller-owned transaction
    pub async fn create_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        student: &MusicSchoolStudent,
    ) -> sqlx::Result<i64> {
        insert(&mut **tx, student).await
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<MusicSchoolStudent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM music_school_students WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(map_student))
    }

    /// Active students ordered by name; all of them when `include_inactive`
    pub async fn list(&self, include_inactive: bool) -> sqlx::Result<Vec<MusicSchoolStudent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM music_school_students WHERE is_active = 1 OR ? ORDER BY name ASC",
            COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_student).collect())
    }

    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM music_school_students WHERE email = ? AND id != ?")
            .bind(email)
            .bind(except_id.unwrap_or(0))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn update(&self, student: &MusicSchoolStudent) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE music_school_students SET
                name = ?, email = ?, phone = ?, birth_date = ?, parent_name = ?, parent_phone = ?,
                instrument = ?, level = ?, teacher = ?, class_type = ?, class_schedule = ?,
                monthly_fee = ?, payment_status = ?, is_active = ?, status = ?, notes = ?,
                progress = ?
            WHERE id = ?
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date)
        .bind(&student.parent_name)
        .bind(&student.parent_phone)
        .bind(&student.instrument)
        .bind(&student.level)
        .bind(&student.teacher)
        .bind(&student.class_type)
        .bind(&student.class_schedule)
        .bind(student.monthly_fee)
        .bind(&student.payment_status)
        .bind(student.is_active)
        .bind(&student.status)
        .bind(&student.notes)
        .bind(&student.progress)
        .bind(student.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE music_school_students SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks the monthly fee as paid at `at`
    pub async fn register_payment(&self, id: i64, at: DateTime<Utc>) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE music_school_students SET last_payment_date = ?, payment_status = ? WHERE id = ?",
        )
        .bind(at)
        .bind(PAYMENT_STATUS_UP_TO_DATE)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn register_attendance(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE music_school_students
            SET total_classes = total_classes + 1, attended_classes = attended_classes + 1
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_active(&self) -> sqlx::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM music_school_students WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }
}

async fn insert(
    conn: &mut sqlx::SqliteConnection,
    student: &MusicSchoolStudent,
) -> sqlx::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO music_school_students (
            name, email, phone, birth_date, parent_name, parent_phone, instrument, level, teacher,
            class_type, class_schedule, monthly_fee, payment_status, last_payment_date,
            enrollment_date, is_active, status, notes, progress, total_classes, attended_classes
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.phone)
    .bind(student.birth_date)
    .bind(&student.parent_name)
    .bind(&student.parent_phone)
    .bind(&student.instrument)
    .bind(&student.level)
    .bind(&student.teacher)
    .bind(&student.class_type)
    .bind(&student.class_schedule)
    .bind(student.monthly_fee)
    .bind(&student.payment_status)
    .bind(student.last_payment_date)
    .bind(student.enrollment_date)
    .bind(student.is_active)
    .bind(&student.status)
    .bind(&student.notes)
    .bind(&student.progress)
    .bind(student.total_classes)
    .bind(student.attended_classes)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

fn map_student(row: &SqliteRow) -> MusicSchoolStudent {
    MusicSchoolStudent {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        birth_date: row.get("birth_date"),
        parent_name: row.get("parent_name"),
        parent_phone: row.get("parent_phone"),
        instrument: row.get("instrument"),
        level: row.get("level"),
        teacher: row.get("teacher"),
        class_type: row.get("class_type"),
        class_schedule: row.get("class_schedule"),
        monthly_fee: row.get("monthly_fee"),
        payment_status: row.get("payment_status"),
        last_payment_date: row.get("last_payment_date"),
        enrollment_date: row.get("enrollment_date"),
        is_active: row.get("is_active"),
        status: row.get("status"),
        notes: row.get("notes"),
        progress: row.get("progress"),
        total_classes: row.get("total_classes"),
        attended_classes: row.get("attended_classes"),
    }
}
