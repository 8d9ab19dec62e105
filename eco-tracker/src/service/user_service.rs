// src/service/user_service.rs

use crate::api::dto::user_dto::{
    ChangePasswordRequest, DeleteAccountResponse, LeaderboardEntry, MonthlyReportCount,
    SeverityCounts, StatusCounts, UpdateProfileRequest, UserStatistics,
};
use crate::db::DbPool;
use crate::domain::incident_model;
use crate::domain::user_model::SafeUser;
use crate::error::AppResult;
use crate::repository::incident_repository::IncidentRepository;
use crate::repository::user_repository::{LeaderboardRow, UpdateUser, UserRepository};
use crate::service::auth_service::{map_unique_violation, normalize_email};
use crate::service::incident_service::IncidentService;
use crate::utils::error_helper::{
    conflict_error, convert_validation_errors, internal_server_error, not_found_error,
    unauthorized_error, validation_error,
};
use crate::utils::password::{PasswordError, PasswordManager};
use crate::utils::transaction::TransactionManager;
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// ランキングの表示件数
pub const LEADERBOARD_LIMIT: u64 = 10;
/// 統計で集計する月数
pub const MONTHLY_REPORT_MONTHS: usize = 6;

pub struct UserService {
    db: DbPool,
    user_repo: Arc<UserRepository>,
    incident_repo: Arc<IncidentRepository>,
    incident_service: Arc<IncidentService>,
    password_manager: Arc<PasswordManager>,
}

impl UserService {
    pub fn new(
        db_pool: DbPool,
        password_manager: Arc<PasswordManager>,
        incident_service: Arc<IncidentService>,
    ) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            incident_repo: Arc::new(IncidentRepository::new(db_pool.clone())),
            db: db_pool,
            incident_service,
            password_manager,
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<SafeUser> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", user_id, "user_service::get_profile"))?;
        Ok(user.to_safe_user())
    }

    /// プロフィール更新（指定されたフィールドのみ）
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<SafeUser> {
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "user_service::update_profile"))?;

        let update = UpdateUser {
            email: request.email.as_deref().map(normalize_email),
            username: request.username.as_deref().map(|u| u.trim().to_string()),
            name: request.name.as_deref().map(|n| n.trim().to_string()),
            profile_picture: request.profile_picture.map(|p| p.trim().to_string()),
        };

        if let Some(email) = update.email.as_deref() {
            if self.user_repo.is_email_taken(email, Some(user_id)).await? {
                return Err(conflict_error(
                    "Email address is already registered",
                    "user_service::update_profile::email_check",
                ));
            }
        }

        if let Some(username) = update.username.as_deref() {
            if self
                .user_repo
                .is_username_taken(username, Some(user_id))
                .await?
            {
                return Err(conflict_error(
                    "Username is already taken",
                    "user_service::update_profile::username_check",
                ));
            }
        }

        let user = self
            .user_repo
            .update(user_id, update)
            .await
            .map_err(map_unique_violation)?
            .ok_or_else(|| not_found_error("User", user_id, "user_service::update_profile"))?;

        info!(user_id = %user_id, "Profile updated");
        Ok(user.to_safe_user())
    }

    /// パスワード変更
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "user_service::change_password"))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", user_id, "user_service::change_password"))?;

        let current_ok = self
            .password_manager
            .verify_password(&request.current_password, &user.password_hash)
            .map_err(|e| {
                internal_server_error(e, "user_service::change_password", "Failed to verify password")
            })?;
        if !current_ok {
            return Err(unauthorized_error(
                "Current password is incorrect",
                "user_service::change_password",
            ));
        }

        let password_hash = self
            .password_manager
            .hash_password(&request.new_password)
            .map_err(|e| match e {
                PasswordError::WeakPassword(message) => validation_error("newPassword", &message),
                other => internal_server_error(
                    other,
                    "user_service::change_password",
                    "Failed to process password",
                ),
            })?;

        self.user_repo
            .update_password_hash(user_id, password_hash)
            .await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// アカウント削除（インシデント削除とユーザー削除を単一トランザクションで実行）
    pub async fn delete_account(&self, user_id: Uuid) -> AppResult<DeleteAccountResponse> {
        let incidents = self.incident_repo.find_by_reporter(user_id).await?;

        let deleted_incidents = self
            .db
            .execute_in_transaction(move |txn| {
                Box::pin(async move {
                    let deleted_incidents =
                        IncidentRepository::delete_all_by_reporter(txn, user_id).await?;
                    let deleted_users = UserRepository::delete_by_id(txn, user_id).await?;

                    if deleted_users == 0 {
                        return Err(not_found_error(
                            "User",
                            user_id,
                            "user_service::delete_account",
                        ));
                    }

                    Ok(deleted_incidents)
                })
            })
            .await?;

        self.incident_service.discard_images_of(&incidents).await;

        info!(
            user_id = %user_id,
            deleted_incidents = deleted_incidents,
            "Account deleted"
        );

        Ok(DeleteAccountResponse {
            message: "Account and all associated incidents deleted".to_string(),
            deleted_incidents,
        })
    }

    /// 報告件数ランキング（上位10名）
    pub async fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = self.user_repo.leaderboard(Some(LEADERBOARD_LIMIT)).await?;
        Ok(rows.into_iter().map(leaderboard_entry).collect())
    }

    /// 個人の統計情報
    pub async fn statistics(&self, user_id: Uuid) -> AppResult<UserStatistics> {
        let incidents = self.incident_repo.find_by_reporter(user_id).await?;
        let ranking = self.user_repo.leaderboard(None).await?;

        let rank = ranking
            .iter()
            .position(|row| row.id == user_id)
            .map(|index| index as u64 + 1)
            .ok_or_else(|| not_found_error("User", user_id, "user_service::statistics"))?;

        Ok(build_statistics(
            &incidents,
            rank,
            ranking.len() as u64,
            Utc::now(),
        ))
    }
}

fn leaderboard_entry(row: LeaderboardRow) -> LeaderboardEntry {
    let display_name = row
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&row.username)
        .to_string();

    LeaderboardEntry {
        id: row.id,
        display_name,
        report_count: row.report_count.max(0) as u64,
    }
}

/// 直近 N ヶ月の (年, 月) を古い順に返す
fn recent_months(now: DateTime<Utc>, months: usize) -> Vec<(i32, u32)> {
    let mut result = Vec::with_capacity(months);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..months {
        result.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    result.reverse();
    result
}

fn build_statistics(
    incidents: &[incident_model::Model],
    rank: u64,
    total_ranked_users: u64,
    now: DateTime<Utc>,
) -> UserStatistics {
    let mut reports_by_severity = SeverityCounts::default();
    let mut reports_by_status = StatusCounts::default();
    let mut impact_score = 0;

    for incident in incidents {
        reports_by_severity.record(incident.severity);
        reports_by_status.record(incident.status);
        impact_score += incident.severity.impact_weight();
    }

    let monthly_reports = recent_months(now, MONTHLY_REPORT_MONTHS)
        .into_iter()
        .map(|(year, month)| MonthlyReportCount {
            month: format!("{:04}-{:02}", year, month),
            count: incidents
                .iter()
                .filter(|i| i.created_at.year() == year && i.created_at.month() == month)
                .count() as u64,
        })
        .collect();

    UserStatistics {
        total_reports: incidents.len() as u64,
        reports_by_severity,
        reports_by_status,
        monthly_reports,
        impact_score,
        rank,
        total_ranked_users,
    }
}
