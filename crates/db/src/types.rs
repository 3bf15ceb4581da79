use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Task progress state. Parsed case-insensitively so that any input casing
/// is folded to the lowercase stored form.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskStage {
    #[default]
    #[sea_orm(string_value = "todo")]
    Todo,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskPriority {
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[default]
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "low")]
    Low,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActivityType {
    #[default]
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "started")]
    Started,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "bug")]
    Bug,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "commented")]
    Commented,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NoticeType {
    #[default]
    #[sea_orm(string_value = "alert")]
    Alert,
    #[sea_orm(string_value = "message")]
    Message,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn stage_and_priority_parse_case_insensitively() {
        assert_eq!(TaskStage::from_str("Todo").unwrap(), TaskStage::Todo);
        assert_eq!(TaskStage::from_str("TODO").unwrap(), TaskStage::Todo);
        assert_eq!(
            TaskStage::from_str("In_Progress").unwrap(),
            TaskStage::InProgress
        );
        assert_eq!(TaskPriority::from_str("High").unwrap(), TaskPriority::High);
        assert_eq!(TaskPriority::from_str("LOW").unwrap(), TaskPriority::Low);
        assert!(TaskStage::from_str("archived").is_err());
    }

    #[test]
    fn display_is_lowercase_stored_form() {
        assert_eq!(TaskStage::InProgress.to_string(), "in_progress");
        assert_eq!(TaskPriority::Normal.to_string(), "normal");
        assert_eq!(ActivityType::Commented.to_string(), "commented");
        assert_eq!(NoticeType::Alert.to_string(), "alert");
    }
}
