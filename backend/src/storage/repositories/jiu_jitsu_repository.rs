use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::{Attendance, Graduation, JiuJitsuStudent, Payment, PAYMENT_STATUS_UP_TO_DATE};

use crate::storage::DbConnection;

const STUDENT_COLUMNS: &str = r#"
    id, name, email, phone, cpf, birth_date, address, belt, stripes, last_promotion_date,
    monthly_fee, last_payment_date, payment_status, emergency_contact, emergency_phone,
    health_conditions, notes, enrollment_date, is_active
"#;

/// Repository for jiu-jitsu students and their graduations, attendance and payments
#[derive(Clone)]
pub struct JiuJitsuRepository {
    db: DbConnection,
}

impl JiuJitsuRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, student: &JiuJitsuStudent) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO jiu_jitsu_students (
                name, email, phone, cpf, birth_date, address, belt, stripes, last_promotion_date,
                monthly_fee, last_payment_date, payment_status, emergency_contact,
                emergency_phone, health_conditions, notes, enrollment_date, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.cpf)
        .bind(student.birth_date)
        .bind(&student.address)
        .bind(&student.belt)
        .bind(student.stripes)
        .bind(student.last_promotion_date)
        .bind(student.monthly_fee)
        .bind(student.last_payment_date)
        .bind(&student.payment_status)
        .bind(&student.emergency_contact)
        .bind(&student.emergency_phone)
        .bind(&student.health_conditions)
        .bind(&student.notes)
        .bind(student.enrollment_date)
        .bind(student.is_active)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<JiuJitsuStudent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM jiu_jitsu_students WHERE id = ?",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(map_student))
    }

    pub async fn list(&self, include_inactive: bool) -> sqlx::Result<Vec<JiuJitsuStudent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM jiu_jitsu_students WHERE is_active = 1 OR ? ORDER BY name ASC",
            STUDENT_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_student).collect())
    }

    /// Ids from `ids` that have no student row
    pub async fn missing_students(&self, ids: &[i64]) -> sqlx::Result<Vec<i64>> {
        let mut missing = Vec::new();
        for id in ids {
            let row = sqlx::query("SELECT 1 FROM jiu_jitsu_students WHERE id = ?")
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;
            if row.is_none() {
                missing.push(*id);
            }
        }
        Ok(missing)
    }

    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM jiu_jitsu_students WHERE email = ? AND id != ?")
            .bind(email)
            .bind(except_id.unwrap_or(0))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn update(&self, student: &JiuJitsuStudent) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jiu_jitsu_students SET
                name = ?, email = ?, phone = ?, cpf = ?, birth_date = ?, address = ?, belt = ?,
                stripes = ?, last_promotion_date = ?, monthly_fee = ?, last_payment_date = ?,
                payment_status = ?, emergency_contact = ?, emergency_phone = ?,
                health_conditions = ?, notes = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.cpf)
        .bind(student.birth_date)
        .bind(&student.address)
        .bind(&student.belt)
        .bind(student.stripes)
        .bind(student.last_promotion_date)
        .bind(student.monthly_fee)
        .bind(student.last_payment_date)
        .bind(&student.payment_status)
        .bind(&student.emergency_contact)
        .bind(&student.emergency_phone)
        .bind(&student.health_conditions)
        .bind(&student.notes)
        .bind(student.is_active)
        .bind(student.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE jiu_jitsu_students SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records the graduation and promotes the student in one transaction
    pub async fn add_graduation(&self, graduation: &Graduation) -> sqlx::Result<i64> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO jiu_jitsu_graduations (
                student_id, from_belt, to_belt, from_stripes, to_stripes, graduation_date,
                graduated_by, notes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(graduation.student_id)
        .bind(&graduation.from_belt)
        .bind(&graduation.to_belt)
        .bind(graduation.from_stripes)
        .bind(graduation.to_stripes)
        .bind(graduation.graduation_date)
        .bind(&graduation.graduated_by)
        .bind(&graduation.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE jiu_jitsu_students SET belt = ?, stripes = ?, last_promotion_date = ? WHERE id = ?",
        )
        .bind(&graduation.to_belt)
        .bind(graduation.to_stripes)
        .bind(graduation.graduation_date)
        .bind(graduation.student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_graduations(&self, student_id: i64) -> sqlx::Result<Vec<Graduation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, from_belt, to_belt, from_stripes, to_stripes, graduation_date,
                   graduated_by, notes
            FROM jiu_jitsu_graduations
            WHERE student_id = ?
            ORDER BY graduation_date DESC, id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_graduation).collect())
    }

    pub async fn all_graduations(&self) -> sqlx::Result<Vec<Graduation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, from_belt, to_belt, from_stripes, to_stripes, graduation_date,
                   graduated_by, notes
            FROM jiu_jitsu_graduations
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_graduation).collect())
    }

    pub async fn remove_graduation(&self, student_id: i64, graduation_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM jiu_jitsu_graduations WHERE id = ? AND student_id = ?")
            .bind(graduation_id)
            .bind(student_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inserts every row or none
    pub async fn add_attendances(&self, attendances: &[Attendance]) -> sqlx::Result<Vec<i64>> {
        let mut tx = self.db.begin().await?;
        let mut ids = Vec::with_capacity(attendances.len());
        for attendance in attendances {
            let result = sqlx::query(
                r#"
                INSERT INTO jiu_jitsu_attendances (student_id, date, class_type, is_present, notes)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(attendance.student_id)
            .bind(attendance.date)
            .bind(&attendance.class_type)
            .bind(attendance.is_present)
            .bind(&attendance.notes)
            .execute(&mut *tx)
            .await?;
            ids.push(result.last_insert_rowid());
        }
        tx.commit().await?;
        Ok(ids)
    }

    /// Most recent first, at most `limit` rows
    pub async fn recent_attendances(&self, student_id: i64, limit: i64) -> sqlx::Result<Vec<Attendance>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, date, class_type, is_present, notes
            FROM jiu_jitsu_attendances
            WHERE student_id = ?
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_attendance).collect())
    }

    pub async fn all_attendances(&self) -> sqlx::Result<Vec<Attendance>> {
        let rows = sqlx::query(
            "SELECT id, student_id, date, class_type, is_present, notes FROM jiu_jitsu_attendances",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_attendance).collect())
    }

    pub async fn remove_attendance(&self, student_id: i64, attendance_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM jiu_jitsu_attendances WHERE id = ? AND student_id = ?")
            .bind(attendance_id)
            .bind(student_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records the payment and marks the student up to date in one transaction
    pub async fn add_payment(&self, payment: &Payment) -> sqlx::Result<i64> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO jiu_jitsu_payments (
                student_id, payment_date, amount, payment_method, reference_month, notes
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.student_id)
        .bind(payment.payment_date)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.reference_month)
        .bind(&payment.notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE jiu_jitsu_students SET last_payment_date = ?, payment_status = ? WHERE id = ?",
        )
        .bind(payment.payment_date)
        .bind(PAYMENT_STATUS_UP_TO_DATE)
        .bind(payment.student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn recent_payments(&self, student_id: i64, limit: i64) -> sqlx::Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, payment_date, amount, payment_method, reference_month, notes
            FROM jiu_jitsu_payments
            WHERE student_id = ?
            ORDER BY payment_date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_payment).collect())
    }

    pub async fn all_payments(&self) -> sqlx::Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, payment_date, amount, payment_method, reference_month, notes
            FROM jiu_jitsu_payments
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_payment).collect())
    }

    pub async fn remove_payment(&self, student_id: i64, payment_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM jiu_jitsu_payments WHERE id = ? AND student_id = ?")
            .bind(payment_id)
            .bind(student_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_active(&self) -> sqlx::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM jiu_jitsu_students WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }
}

fn map_student(row: &SqliteRow) -> JiuJitsuStudent {
    JiuJitsuStudent {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        cpf: row.get("cpf"),
        birth_date: row.get("birth_date"),
        address: row.get("address"),
        belt: row.get("belt"),
        stripes: row.get("stripes"),
        last_promotion_date: row.get("last_promotion_date"),
        monthly_fee: row.get("monthly_fee"),
        last_payment_date: row.get("last_payment_date"),
        payment_status: row.get("payment_status"),
        emergency_contact: row.get("emergency_contact"),
        emergency_phone: row.get("emergency_phone"),
        health_conditions: row.get("health_conditions"),
        notes: row.get("notes"),
        enrollment_date: row.get("enrollment_date"),
        is_active: row.get("is_active"),
    }
}

fn map_graduation(row: &SqliteRow) -> Graduation {
    Graduation {
        id: row.get("id"),
        student_id: row.get("student_id"),
        from_belt: row.get("from_belt"),
        to_belt: row.get("to_belt"),
        from_stripes: row.get("from_stripes"),
        to_stripes: row.get("to_stripes"),
        graduation_date: row.get("graduation_date"),
        graduated_by: row.get("graduated_by"),
        notes: row.get("notes"),
    }
}

fn map_attendance(row: &SqliteRow) -> Attendance {
    Attendance {
        id: row.get("id"),
        student_id: row.get("student_id"),
        date: row.get("date"),
        class_type: row.get("class_type"),
        is_present: row.get("is_present"),
        notes: row.get("notes"),
    }
}

fn map_payment(row: &SqliteRow) -> Payment {
    Payment {
        id: row.get("id"),
        student_id: row.get("student_id"),
        payment_date: row.get("payment_date"),
        amount: row.get("amount"),
        payment_method: row.get("payment_method"),
        reference_month: row.get("reference_month"),
        notes: row.get("notes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn student() -> JiuJitsuStudent {
        JiuJitsuStudent {
            id: 0,
            name: "Carlos".to_string(),
            email: "carlos@example.com".to_string(),
            phone: "11999990000".to_string(),
            cpf: None,
            birth_date: None,
            address: None,
            belt: "Branca".to_string(),
            stripes: 2,
            last_promotion_date: None,
            monthly_fee: 120.0,
            last_payment_date: None,
            payment_status: "Atrasado".to_string(),
            emergency_contact: None,
            emergency_phone: None,
            health_conditions: None,
            notes: None,
            enrollment_date: Utc::now(),
            is_active: true,
        }
    }

    async fn setup_test() -> (JiuJitsuRepository, i64) {
        let repo = JiuJitsuRepository::new(DbConnection::in_memory().await.unwrap());
        let id = repo.create(&student()).await.unwrap();
        (repo, id)
    }

    #[tokio::test]
    async fn test_graduation_promotes_student() {
        let (repo, id) = setup_test().await;
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        repo.add_graduation(&Graduation {
            id: 0,
            student_id: id,
            from_belt: "Branca".to_string(),
            to_belt: "Azul".to_string(),
            from_stripes: 2,
            to_stripes: 0,
            graduation_date: date,
            graduated_by: Some("Mestre".to_string()),
            notes: None,
        })
        .await
        .unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.belt, "Azul");
        assert_eq!(stored.stripes, 0);
        assert_eq!(stored.last_promotion_date, Some(date));
        assert_eq!(repo.list_graduations(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_marks_student_up_to_date() {
        let (repo, id) = setup_test().await;
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();

        repo.add_payment(&Payment {
            id: 0,
            student_id: id,
            payment_date: date,
            amount: 120.0,
            payment_method: "Pix".to_string(),
            reference_month: "2024-06".to_string(),
            notes: None,
        })
        .await
        .unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PAYMENT_STATUS_UP_TO_DATE);
        assert_eq!(stored.last_payment_date, Some(date));
    }

    #[tokio::test]
    async fn test_bulk_attendance_is_all_or_nothing() {
        let (repo, id) = setup_test().await;
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let row = |student_id| Attendance {
            id: 0,
            student_id,
            date,
            class_type: "Treino".to_string(),
            is_present: true,
            notes: None,
        };

        // the second row violates the foreign key
        let result = repo.add_attendances(&[row(id), row(9999)]).await;
        assert!(result.is_err());
        assert!(repo.all_attendances().await.unwrap().is_empty());

        let ids = repo.add_attendances(&[row(id), row(id)]).await.unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_is_scoped_to_student() {
        let (repo, id) = setup_test().await;
        let other = repo
            .create(&JiuJitsuStudent { email: "other@example.com".to_string(), ..student() })
            .await
            .unwrap();
        let ids = repo
            .add_attendances(&[Attendance {
                id: 0,
                student_id: id,
                date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
                class_type: "Treino".to_string(),
                is_present: true,
                notes: None,
            }])
            .await
            .unwrap();

        assert!(!repo.remove_attendance(other, ids[0]).await.unwrap());
        assert!(repo.remove_attendance(id, ids[0]).await.unwrap());
    }
}
