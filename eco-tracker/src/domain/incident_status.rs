// src/domain/incident_status.rs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// インシデントの対応状況
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    #[sea_orm(string_value = "reported")]
    Reported,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Reported,
            Self::Investigating,
            Self::Resolved,
            Self::Closed,
        ]
    }

    /// 対応が終了しているか
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl Default for IncidentStatus {
    fn default() -> Self {
        Self::Reported
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid status '{}'. Valid statuses are: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}
