use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MensGroupMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub is_active: bool,
    /// e.g. "Líder", "Membro"
    pub role: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MensGroupMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: Option<NaiveDate>,
    pub role: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MensGroupStats {
    pub total_members: u32,
    pub active_members: u32,
    pub inactive_members: u32,
    pub joined_this_year: u32,
    pub roles: BTreeMap<String, u32>,
}
