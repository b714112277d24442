//! Externally administered policy: emergency shutdown, university break
//! window, faculty-priority window and the off-peak reward window.
//!
//! Policies live as JSON documents in a [`PolicySource`] (a fast key-value
//! store in production). [`PolicyStore`] reads through to the source and falls
//! back to the last value set in-process when the source has nothing usable.

mod gates;
mod source;
mod store;

pub use gates::*;
pub use source::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNIVERSITY_POLICY_KEY: &str = "tnt:policy:university";
pub const FACULTY_PRIORITY_POLICY_KEY: &str = "tnt:policy:faculty_priority";
pub const OFFPEAK_REWARD_POLICY_KEY: &str = "tnt:policy:offpeak_rewards";
pub const EMERGENCY_SHUTDOWN_KEY: &str = "tnt:emergency_shutdown";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PolicyError {
    #[error("Policy source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Invalid policy: {0}")]
    Invalid(String),
}

/// Campus-wide ordering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniversityPolicy {
    pub enabled: bool,
    pub break_start_hour: u32,
    pub break_end_hour: u32,
    pub max_orders_per_user: u32,
    pub min_slot_duration_minutes: u32,
}

impl Default for UniversityPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            break_start_hour: 12,
            break_end_hour: 14,
            max_orders_per_user: 3,
            min_slot_duration_minutes: 15,
        }
    }
}

/// Hours during which only faculty (and admins) may book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacultyPriorityPolicy {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for FacultyPriorityPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 12,
            end_hour: 14,
        }
    }
}

/// Extra reward points for orders created in a quiet window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffPeakRewardPolicy {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
    pub bonus_points_per_order: f64,
}

impl Default for OffPeakRewardPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 15,
            end_hour: 17,
            bonus_points_per_order: 10.0,
        }
    }
}

impl OffPeakRewardPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.start_hour > 23 || !(1..=24).contains(&self.end_hour) {
            return Err(PolicyError::Invalid("Hours must be within 0-24".to_string()));
        }
        if self.end_hour <= self.start_hour {
            return Err(PolicyError::Invalid(
                "end_hour must be greater than start_hour".to_string(),
            ));
        }
        if self.bonus_points_per_order < 0.0 {
            return Err(PolicyError::Invalid(
                "bonus_points_per_order must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// `start <= hour < end`.
pub fn is_hour_in_window(hour: u32, start_hour: u32, end_hour: u32) -> bool {
    start_hour <= hour && hour < end_hour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_documents_fill_defaults() {
        let policy: UniversityPolicy = serde_json::from_str(r#"{"enabled":true}"#).unwrap();
        assert!(policy.enabled);
        assert_eq!(policy.break_start_hour, 12);
        assert_eq!(policy.max_orders_per_user, 3);
    }

    #[test]
    fn test_offpeak_validation() {
        let mut policy = OffPeakRewardPolicy::default();
        assert!(policy.validate().is_ok());

        policy.end_hour = policy.start_hour;
        assert!(policy.validate().is_err());

        policy = OffPeakRewardPolicy { start_hour: 24, end_hour: 24, ..Default::default() };
        assert!(policy.validate().is_err());

        policy = OffPeakRewardPolicy { bonus_points_per_order: -1.0, ..Default::default() };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_window_is_half_open() {
        assert!(is_hour_in_window(12, 12, 14));
        assert!(is_hour_in_window(13, 12, 14));
        assert!(!is_hour_in_window(14, 12, 14));
        assert!(!is_hour_in_window(11, 12, 14));
    }
}
