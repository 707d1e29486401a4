use serde::{Deserialize, Serialize};

/// Headline counts for the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: u32,
    pub total_music_students: u32,
    pub total_jiu_jitsu_students: u32,
    pub total_mens_group_members: u32,
    pub total_child_presentations: u32,
    pub pending_pre_registrations: u32,
}
