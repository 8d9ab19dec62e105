// src/api/dto/user_dto.rs

use crate::domain::incident_severity::IncidentSeverity;
use crate::domain::incident_status::IncidentStatus;
use crate::utils::validation::{self, password, username};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// プロフィール更新リクエスト（指定したフィールドのみ変更）
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = validation::validate_not_blank)
    )]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(
            min = username::MIN_LENGTH,
            max = username::MAX_LENGTH,
            message = "Username must be between 3 and 30 characters"
        ),
        custom(function = validation::validate_username)
    )]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2048, message = "Profile picture URI is too long"))]
    pub profile_picture: Option<String>,
}

/// パスワード変更リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(
        length(
            min = password::MIN_LENGTH,
            max = password::MAX_LENGTH,
            message = "New password must be between 8 and 128 characters"
        ),
        custom(function = validation::validate_password_strength)
    )]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// アカウント削除結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub message: String,
    pub deleted_incidents: u64,
}

/// ランキングの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub display_name: String,
    pub report_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: IncidentSeverity) {
        match severity {
            IncidentSeverity::Low => self.low += 1,
            IncidentSeverity::Medium => self.medium += 1,
            IncidentSeverity::High => self.high += 1,
            IncidentSeverity::Critical => self.critical += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub reported: u64,
    pub investigating: u64,
    pub resolved: u64,
    pub closed: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: IncidentStatus) {
        match status {
            IncidentStatus::Reported => self.reported += 1,
            IncidentStatus::Investigating => self.investigating += 1,
            IncidentStatus::Resolved => self.resolved += 1,
            IncidentStatus::Closed => self.closed += 1,
        }
    }
}

/// 月別の報告件数（`YYYY-MM`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReportCount {
    pub month: String,
    pub count: u64,
}

/// 個人の統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_reports: u64,
    pub reports_by_severity: SeverityCounts,
    pub reports_by_status: StatusCounts,
    pub monthly_reports: Vec<MonthlyReportCount>,
    pub impact_score: u64,
    /// 全体ランキングでの順位（1始まり）
    pub rank: u64,
    pub total_ranked_users: u64,
}
