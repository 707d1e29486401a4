use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MEMBER_GENDER: &str = "Não informado";
pub const DEFAULT_MARITAL_STATUS: &str = "Solteiro(a)";
pub const DEFAULT_MEMBERSHIP_TYPE: &str = "Membro";
pub const DEFAULT_BAPTISM_STATUS: &str = "Não batizado";

/// A church member with personal, contact and ecclesiastical data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub marital_status: String,
    pub profession: Option<String>,
    pub education: Option<String>,
    /// Web-root relative path of the uploaded photo
    pub photo_path: Option<String>,
    pub email: String,
    pub phone: String,
    pub alternative_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub membership_date: NaiveDate,
    pub membership_type: String,
    pub baptism_status: String,
    pub baptism_date: Option<NaiveDate>,
    pub baptism_location: Option<String>,
    pub previous_church: Option<String>,
    pub ministry: Option<String>,
    pub cell_group: Option<String>,
    pub leadership_position: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

/// Relative of a member, optionally a member themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: i64,
    pub member_id: i64,
    pub name: String,
    pub relationship: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_church_member: bool,
    pub church_member_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: Member,
    pub family_members: Vec<FamilyMember>,
}

/// Create and update body for members. `isActive` only applies on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberRequest {
    pub full_name: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub profession: Option<String>,
    pub education: Option<String>,
    pub email: String,
    pub phone: String,
    pub alternative_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub membership_date: Option<NaiveDate>,
    pub membership_type: Option<String>,
    pub baptism_status: Option<String>,
    pub baptism_date: Option<NaiveDate>,
    pub baptism_location: Option<String>,
    pub previous_church: Option<String>,
    pub ministry: Option<String>,
    pub cell_group: Option<String>,
    pub leadership_position: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMemberRequest {
    pub name: String,
    pub relationship: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_church_member: bool,
    pub church_member_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub photo_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAgeGroups {
    pub children: u32,
    pub teens: u32,
    pub young_adults: u32,
    pub adults: u32,
    pub seniors: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total_members: u32,
    pub active_members: u32,
    pub inactive_members: u32,
    pub membership_types: BTreeMap<String, u32>,
    pub gender_distribution: BTreeMap<String, u32>,
    pub age_groups: MemberAgeGroups,
    pub marital_status: BTreeMap<String, u32>,
    pub baptism_status: BTreeMap<String, u32>,
    pub members_with_family: u32,
    pub total_family_members: u32,
}
