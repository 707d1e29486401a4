use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

use shared::{FamilyMember, Member};

use crate::storage::DbConnection;

const MEMBER_COLUMNS: &str = r#"
    id, full_name, cpf, rg, birth_date, gender, marital_status, profession, education,
    photo_path, email, phone, alternative_phone, address, neighborhood, city, state, zip_code,
    membership_date, membership_type, baptism_status, baptism_date, baptism_location,
    previous_church, ministry, cell_group, leadership_position, emergency_contact_name,
    emergency_contact_phone, emergency_contact_relationship, notes, is_active
"#;

const FAMILY_COLUMNS: &str = r#"
    id, member_id, name, relationship, birth_date, phone, email, is_church_member,
    church_member_id, notes
"#;

/// Repository for members and their family rows
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a member, returning the new id. `member.id` is ignored.
    pub async fn create(&self, member: &Member) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (
                full_name, cpf, rg, birth_date, gender, marital_status, profession, education,
                photo_path, email, phone, alternative_phone, address, neighborhood, city, state,
                zip_code, membership_date, membership_type, baptism_status, baptism_date,
                baptism_location, previous_church, ministry, cell_group, leadership_position,
                emergency_contact_name, emergency_contact_phone, emergency_contact_relationship,
                notes, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.full_name)
        .bind(&member.cpf)
        .bind(&member.rg)
        .bind(member.birth_date)
        .bind(&member.gender)
        .bind(&member.marital_status)
        .bind(&member.profession)
        .bind(&member.education)
        .bind(&member.photo_path)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.alternative_phone)
        .bind(&member.address)
        .bind(&member.neighborhood)
        .bind(&member.city)
        .bind(&member.state)
        .bind(&member.zip_code)
        .bind(member.membership_date)
        .bind(&member.membership_type)
        .bind(&member.baptism_status)
        .bind(member.baptism_date)
        .bind(&member.baptism_location)
        .bind(&member.previous_church)
        .bind(&member.ministry)
        .bind(&member.cell_group)
        .bind(&member.leadership_position)
        .bind(&member.emergency_contact_name)
        .bind(&member.emergency_contact_phone)
        .bind(&member.emergency_contact_relationship)
        .bind(&member.notes)
        .bind(member.is_active)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> sqlx::Result<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(map_member))
    }

    /// Members ordered by name
    pub async fn list(&self, include_inactive: bool) -> sqlx::Result<Vec<Member>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members WHERE is_active = 1 OR ? ORDER BY full_name ASC",
            MEMBER_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_member).collect())
    }

    /// Whether another member already uses `email` (case-insensitive)
    pub async fn email_in_use(&self, email: &str, except_id: Option<i64>) -> sqlx::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM members WHERE email = ? AND id != ?")
            .bind(email)
            .bind(except_id.unwrap_or(0))
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    /// Full-field update; returns false when the id does not exist
    pub async fn update(&self, member: &Member) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members SET
                full_name = ?, cpf = ?, rg = ?, birth_date = ?, gender = ?, marital_status = ?,
                profession = ?, education = ?, email = ?, phone = ?, alternative_phone = ?,
                address = ?, neighborhood = ?, city = ?, state = ?, zip_code = ?,
                membership_date = ?, membership_type = ?, baptism_status = ?, baptism_date = ?,
                baptism_location = ?, previous_church = ?, ministry = ?, cell_group = ?,
                leadership_position = ?, emergency_contact_name = ?, emergency_contact_phone = ?,
                emergency_contact_relationship = ?, notes = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.full_name)
        .bind(&member.cpf)
        .bind(&member.rg)
        .bind(member.birth_date)
        .bind(&member.gender)
        .bind(&member.marital_status)
        .bind(&member.profession)
        .bind(&member.education)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.alternative_phone)
        .bind(&member.address)
        .bind(&member.neighborhood)
        .bind(&member.city)
        .bind(&member.state)
        .bind(&member.zip_code)
        .bind(member.membership_date)
        .bind(&member.membership_type)
        .bind(&member.baptism_status)
        .bind(member.baptism_date)
        .bind(&member.baptism_location)
        .bind(&member.previous_church)
        .bind(&member.ministry)
        .bind(&member.cell_group)
        .bind(&member.leadership_position)
        .bind(&member.emergency_contact_name)
        .bind(&member.emergency_contact_phone)
        .bind(&member.emergency_contact_relationship)
        .bind(&member.notes)
        .bind(member.is_active)
        .bind(member.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_photo_path(&self, id: i64, photo_path: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE members SET photo_path = ? WHERE id = ?")
            .bind(photo_path)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE members SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn add_family_member(&self, family: &FamilyMember) -> sqlx::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO family_members (
                member_id, name, relationship, birth_date, phone, email, is_church_member,
                church_member_id, notes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(family.member_id)
        .bind(&family.name)
        .bind(&family.relationship)
        .bind(family.birth_date)
        .bind(&family.phone)
        .bind(&family.email)
        .bind(family.is_church_member)
        .bind(family.church_member_id)
        .bind(&family.notes)
        .execute(self.db.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_family_member(
        &self,
        member_id: i64,
        family_id: i64,
    ) -> sqlx::Result<Option<FamilyMember>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM family_members WHERE id = ? AND member_id = ?",
            FAMILY_COLUMNS
        ))
        .bind(family_id)
        .bind(member_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(map_family_member))
    }

    pub async fn list_family(&self, member_id: i64) -> sqlx::Result<Vec<FamilyMember>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM family_members WHERE member_id = ? ORDER BY name ASC",
            FAMILY_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(map_family_member).collect())
    }

    /// Update scoped to the owning member
    pub async fn update_family_member(&self, family: &FamilyMember) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE family_members SET
                name = ?, relationship = ?, birth_date = ?, phone = ?, email = ?,
                is_church_member = ?, church_member_id = ?, notes = ?
            WHERE id = ? AND member_id = ?
            "#,
        )
        .bind(&family.name)
        .bind(&family.relationship)
        .bind(family.birth_date)
        .bind(&family.phone)
        .bind(&family.email)
        .bind(family.is_church_member)
        .bind(family.church_member_id)
        .bind(&family.notes)
        .bind(family.id)
        .bind(family.member_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_family_member(&self, member_id: i64, family_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM family_members WHERE id = ? AND member_id = ?")
            .bind(family_id)
            .bind(member_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of family rows per member id
    pub async fn family_sizes(&self) -> sqlx::Result<HashMap<i64, u32>> {
        let rows = sqlx::query(
            "SELECT member_id, COUNT(*) AS total FROM family_members GROUP BY member_id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows
            .iter()
            .map(|row| {
                let total: i64 = row.get("total");
                (row.get("member_id"), total as u32)
            })
            .collect())
    }

    pub async fn count_active(&self) -> sqlx::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM members WHERE is_active = 1")
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.get("total"))
    }
}

fn map_member(row: &SqliteRow) -> Member {
    Member {
        id: row.get("id"),
        full_name: row.get("full_name"),
        cpf: row.get("cpf"),
        rg: row.get("rg"),
        birth_date: row.get("birth_date"),
        gender: row.get("gender"),
        marital_status: row.get("marital_status"),
        profession: row.get("profession"),
        education: row.get("education"),
        photo_path: row.get("photo_path"),
        email: row.get("email"),
        phone: row.get("phone"),
        alternative_phone: row.get("alternative_phone"),
        address: row.get("address"),
        neighborhood: row.get("neighborhood"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        membership_date: row.get("membership_date"),
        membership_type: row.get("membership_type"),
        baptism_status: row.get("baptism_status"),
        baptism_date: row.get("baptism_date"),
        baptism_location: row.get("baptism_location"),
        previous_church: row.get("previous_church"),
        ministry: row.get("ministry"),
        cell_group: row.get("cell_group"),
        leadership_position: row.get("leadership_position"),
        emergency_contact_name: row.get("emergency_contact_name"),
        emergency_contact_phone: row.get("emergency_contact_phone"),
        emergency_contact_relationship: row.get("emergency_contact_relationship"),
        notes: row.get("notes"),
        is_active: row.get("is_active"),
    }
}

fn map_family_member(row: &SqliteRow) -> FamilyMember {
    FamilyMember {
        id: row.get("id"),
        member_id: row.get("member_id"),
        name: row.get("name"),
        relationship: row.get("relationship"),
        birth_date: row.get("birth_date"),
        phone: row.get("phone"),
        email: row.get("email"),
        is_church_member: row.get("is_church_member"),
        church_member_id: row.get("church_member_id"),
        notes: row.get("notes"),
    }
}
