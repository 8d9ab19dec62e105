// src/domain/incident_category.rs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// インシデントの種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    #[sea_orm(string_value = "pollution")]
    Pollution,
    #[sea_orm(string_value = "deforestation")]
    Deforestation,
    #[sea_orm(string_value = "wildlife")]
    Wildlife,
    #[sea_orm(string_value = "waste")]
    Waste,
    #[sea_orm(string_value = "other")]
    Other,
}

impl IncidentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pollution => "pollution",
            Self::Deforestation => "deforestation",
            Self::Wildlife => "wildlife",
            Self::Waste => "waste",
            Self::Other => "other",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Pollution,
            Self::Deforestation,
            Self::Wildlife,
            Self::Waste,
            Self::Other,
        ]
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|category| category.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid category '{}'. Valid categories are: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}
