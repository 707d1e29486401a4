use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::ChildPresentation;

use crate::storage::DbConnection;

const COLUMNS: &str = r#"
    id, child_name, birth_date, gender, birth_place, father_name, father_profession,
    mother_name, mother_profession, presentation_date, pastor, biblical_verse, special_message,
    address, city, phone, email, church_name, church_address, certificate_generated,
    certificate_path, created_at, notes, is_active
"#;

/// Repository for child presentations.
///
/// Certificate columns are only written through [`PresentationRepository::mark_certificate_generated`];
/// regular updates never touch them.
#[derive(Clone)]
pub struct PresentationRepository {
    db: DbConnection,
}

impl PresentationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Inserts a fresh record with no certificate
    pub async fn create(&self, presentation: &ChildPresentation) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO child_presentations (
                child_name, birth_date, gender, birth_place, father_name, father_profession,
                mother_name, mother_profession, presentation_date, pastor, biblical_verse,
                special_message, address, city, phone, email, church_name, church_address,
                certificate_generated, certificate_path, created_at, notes, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?, ?, ?)
            "#,
        )
        .bind(&presentation.child_name)
        .bind(presentation.birth_date)
        .bind(&presentation.gender)
        .bind(&presentation.birth_place)
        .bind(&presentation.father_name)
        .bind(&presentation.father_profession)
        .bind(&presentation.mother_name)
        .bind(&presentation.mother_profession)
        .bind(presentation.presentation_date)
        .bind(&presentation.pastor)
        .bind(&presentation.biblical_verse)
        .bind(&presentation.special_message)
        .bind(&presentation.address)
        .bind(&presentation.city)
        .bind(&presentation.phone)
        .bind(&presentation.email)
        .bind(&presentation.church_name)
        .bind(&presentation.church_address)
        .bind(presentation.created_at)
        .bind(&presentation.notes)
        .bind(presentation.is_active)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<ChildPresentation>> {
        let row = sqlx::query(&format!("SELECT {} FROM child_presentations WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(map_presentation))
    }

    /// Newest ceremonies first
    pub async fn list(&self, include_inactive: bool) -> sqlx::Result<Vec<ChildPresentation>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM child_presentations
            WHERE is_active = 1 OR ?
            ORDER BY presentation_date DESC, id DESC
            "#,
            COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_presentation).collect())
    }

    pub async fn update(&self, presentation: &ChildPresentation) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE child_presentations SET
                child_name = ?, birth_date = ?, gender = ?, birth_place = ?, father_name = ?,
                father_profession = ?, mother_name = ?, mother_profession = ?,
                presentation_date = ?, pastor = ?, biblical_verse = ?, special_message = ?,
                address = ?, city = ?, phone = ?, email = ?, church_name = ?, church_address = ?,
                notes = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&presentation.child_name)
        .bind(presentation.birth_date)
        .bind(&presentation.gender)
        .bind(&presentation.birth_place)
        .bind(&presentation.father_name)
        .bind(&presentation.father_profession)
        .bind(&presentation.mother_name)
        .bind(&presentation.mother_profession)
        .bind(presentation.presentation_date)
        .bind(&presentation.pastor)
        .bind(&presentation.biblical_verse)
        .bind(&presentation.special_message)
        .bind(&presentation.address)
        .bind(&presentation.city)
        .bind(&presentation.phone)
        .bind(&presentation.email)
        .bind(&presentation.church_name)
        .bind(&presentation.church_address)
        .bind(&presentation.notes)
        .bind(presentation.is_active)
        .bind(presentation.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE child_presentations SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_active(&self) -> sqlx::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM child_presentations WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }

    /// Sets the flag and the path in a single statement so they never disagree
    pub async fn mark_certificate_generated(&self, id: i64, path: &str) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE child_presentations SET certificate_generated = 1, certificate_path = ? WHERE id = ?",
        )
        .bind(path)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_presentation(row: &SqliteRow) -> ChildPresentation {
    ChildPresentation {
        id: row.get("id"),
        child_name: row.get("child_name"),
        birth_date: row.get("birth_date"),
        gender: row.get("gender"),
        birth_place: row.get("birth_place"),
        father_name: row.get("father_name"),
        father_profession: row.get("father_profession"),
        mother_name: row.get("mother_name"),
        mother_profession: row.get("mother_profession"),
        presentation_date: row.get("presentation_date"),
        pastor: row.get("pastor"),
        biblical_verse: row.get("biblical_verse"),
        special_message: row.get("special_message"),
        address: row.get("address"),
        city: row.get("city"),
        phone: row.get("phone"),
        email: row.get("email"),
        church_name: row.get("church_name"),
        church_address: row.get("church_address"),
        certificate_generated: row.get("certificate_generated"),
        certificate_path: row.get("certificate_path"),
        created_at: row.get("created_at"),
        notes: row.get("notes"),
        is_active: row.get("is_active"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn sample() -> ChildPresentation {
        ChildPresentation {
            id: 0,
            child_name: "Ana Souza".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            gender: "Feminino".to_string(),
            birth_place: None,
            father_name: "João Souza".to_string(),
            father_profession: None,
            mother_name: "Maria Souza".to_string(),
            mother_profession: None,
            presentation_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            pastor: "Pedro".to_string(),
            biblical_verse: None,
            special_message: None,
            address: None,
            city: None,
            phone: None,
            email: None,
            church_name: "Igreja".to_string(),
            church_address: None,
            certificate_generated: false,
            certificate_path: None,
            created_at: Utc::now(),
            notes: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_update_never_touches_certificate_columns() {
        let repo = PresentationRepository::new(DbConnection::in_memory().await.unwrap());
        let id = repo.create(&sample()).await.unwrap();
        repo.mark_certificate_generated(id, "uploads/certificates/a.pdf").await.unwrap();

        let mut edited = repo.get(id).await.unwrap().unwrap();
        edited.child_name = "Ana Clara Souza".to_string();
        edited.certificate_generated = false;
        edited.certificate_path = None;
        assert!(repo.update(&edited).await.unwrap());

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.child_name, "Ana Clara Souza");
        assert!(stored.certificate_generated);
        assert_eq!(stored.certificate_path.as_deref(), Some("uploads/certificates/a.pdf"));
    }

    #[tokio::test]
    async fn test_flag_without_path_is_rejected() {
        let repo = PresentationRepository::new(DbConnection::in_memory().await.unwrap());
        let id = repo.create(&sample()).await.unwrap();

        let result = sqlx::query("UPDATE child_presentations SET certificate_generated = 1 WHERE id = ?")
            .bind(id)
            .execute(repo.db.pool())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_orders_by_presentation_date_desc() {
        let repo = PresentationRepository::new(DbConnection::in_memory().await.unwrap());
        let mut older = sample();
        older.presentation_date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        repo.create(&older).await.unwrap();
        let newer_id = repo.create(&sample()).await.unwrap();

        let listed = repo.list(false).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer_id);
    }
}
