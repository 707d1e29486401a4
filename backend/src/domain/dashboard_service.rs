//! # Dashboard Service
//!
//! Headline counts across every module, shown on the landing page.

use tracing::info;

use shared::DashboardStats;

use crate::domain::errors::DomainResult;
use crate::storage::{
    DbConnection, JiuJitsuRepository, MemberRepository, MensGroupRepository,
    MusicSchoolRepository, PreRegistrationRepository, PresentationRepository,
};

#[derive(Clone)]
pub struct DashboardService {
    members: MemberRepository,
    music_school: MusicSchoolRepository,
    jiu_jitsu: JiuJitsuRepository,
    mens_group: MensGroupRepository,
    presentations: PresentationRepository,
    pre_registrations: PreRegistrationRepository,
}

impl DashboardService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            members: MemberRepository::new(db.clone()),
            music_school: MusicSchoolRepository::new(db.clone()),
            jiu_jitsu: JiuJitsuRepository::new(db.clone()),
            mens_group: MensGroupRepository::new(db.clone()),
            presentations: PresentationRepository::new(db.clone()),
            pre_registrations: PreRegistrationRepository::new(db),
        }
    }

    pub async fn stats(&self) -> DomainResult<DashboardStats> {
        info!("Computing dashboard stats");
        Ok(DashboardStats {
            total_members: self.members.count_active().await? as u32,
            total_music_students: self.music_school.count_active().await? as u32,
            total_jiu_jitsu_students: self.jiu_jitsu.count_active().await? as u32,
            total_mens_group_members: self.mens_group.count_active().await? as u32,
            total_child_presentations: self.presentations.count_active().await? as u32,
            pending_pre_registrations: self.pre_registrations.count_pending().await? as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_database_is_all_zero() {
        let db = DbConnection::in_memory().await.unwrap();

        let stats = DashboardService::new(db).stats().await.unwrap();

        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_counts_only_active_rows() {
        let db = DbConnection::in_memory().await.unwrap();
        for (email, active) in [("a@x.com", 1), ("b@x.com", 1), ("c@x.com", 0)] {
            sqlx::query(
                "INSERT INTO mens_group_members (name, email, phone, join_date, is_active) VALUES ('N', ?, '1', '2024-01-01', ?)",
            )
            .bind(email)
            .bind(active)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let stats = DashboardService::new(db).stats().await.unwrap();

        assert_eq!(stats.total_mens_group_members, 2);
        assert_eq!(stats.total_members, 0);
    }
}
