use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use super::{is_hour_in_window, FacultyPriorityPolicy, PolicyStore, UniversityPolicy};
use crate::domain::Role;

/// A policy precondition that rejected the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Service temporarily unavailable due to emergency shutdown")]
    EmergencyShutdown,
    #[error("This slot is reserved for faculty during priority window")]
    FacultyPriority,
    #[error("Orders are allowed only during university break window")]
    OutsideBreakWindow,
    #[error("Maximum orders per user reached for this day")]
    DailyLimitReached,
    #[error("Slot duration violates university policy")]
    SlotTooShort,
}

impl GateError {
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::EmergencyShutdown => 503,
            GateError::FacultyPriority => 403,
            GateError::OutsideBreakWindow
            | GateError::DailyLimitReached
            | GateError::SlotTooShort => 400,
        }
    }
}

/// Rejects every mutating operation while the emergency flag is set.
pub fn ensure_open(policy: &PolicyStore) -> Result<(), GateError> {
    if policy.emergency_shutdown() {
        warn!("Rejected by emergency shutdown");
        return Err(GateError::EmergencyShutdown);
    }
    Ok(())
}

pub fn check_faculty_priority(
    policy: &FacultyPriorityPolicy,
    slot_hour: u32,
    role: Role,
) -> Result<(), GateError> {
    if policy.enabled
        && is_hour_in_window(slot_hour, policy.start_hour, policy.end_hour)
        && !role.has_faculty_priority()
    {
        return Err(GateError::FacultyPriority);
    }
    Ok(())
}

pub fn check_break_window(policy: &UniversityPolicy, slot_hour: u32) -> Result<(), GateError> {
    if policy.enabled
        && !is_hour_in_window(slot_hour, policy.break_start_hour, policy.break_end_hour)
    {
        return Err(GateError::OutsideBreakWindow);
    }
    Ok(())
}

/// `placed_today` counts the user's non-cancelled orders for the current day.
pub fn check_daily_limit(policy: &UniversityPolicy, placed_today: usize) -> Result<(), GateError> {
    if policy.enabled && placed_today >= policy.max_orders_per_user as usize {
        return Err(GateError::DailyLimitReached);
    }
    Ok(())
}

pub fn check_slot_duration(
    policy: &UniversityPolicy,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), GateError> {
    if !policy.enabled {
        return Ok(());
    }
    let minutes = (end - start).num_minutes();
    if minutes < i64::from(policy.min_slot_duration_minutes) {
        return Err(GateError::SlotTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn priority_window() -> FacultyPriorityPolicy {
        FacultyPriorityPolicy { enabled: true, start_hour: 12, end_hour: 14 }
    }

    #[test]
    fn test_faculty_window_blocks_students_only() {
        let policy = priority_window();
        assert_eq!(
            check_faculty_priority(&policy, 12, Role::Student),
            Err(GateError::FacultyPriority)
        );
        assert_eq!(check_faculty_priority(&policy, 13, Role::Faculty), Ok(()));
        assert_eq!(check_faculty_priority(&policy, 13, Role::Admin), Ok(()));
        assert_eq!(check_faculty_priority(&policy, 14, Role::Student), Ok(()));

        let disabled = FacultyPriorityPolicy { enabled: false, ..policy };
        assert_eq!(check_faculty_priority(&disabled, 12, Role::Student), Ok(()));
        assert_eq!(GateError::FacultyPriority.status_code(), 403);
    }

    #[test]
    fn test_university_gates_only_apply_when_enabled() {
        let off = UniversityPolicy::default();
        assert_eq!(check_break_window(&off, 8), Ok(()));
        assert_eq!(check_daily_limit(&off, 100), Ok(()));

        let on = UniversityPolicy { enabled: true, ..Default::default() };
        assert_eq!(check_break_window(&on, 8), Err(GateError::OutsideBreakWindow));
        assert_eq!(check_break_window(&on, 12), Ok(()));
        assert_eq!(check_daily_limit(&on, 2), Ok(()));
        assert_eq!(check_daily_limit(&on, 3), Err(GateError::DailyLimitReached));
    }

    #[test]
    fn test_slot_duration() {
        let on = UniversityPolicy { enabled: true, ..Default::default() };
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let short = start + chrono::Duration::minutes(10);
        let long = start + chrono::Duration::minutes(15);
        assert_eq!(check_slot_duration(&on, start, short), Err(GateError::SlotTooShort));
        assert_eq!(check_slot_duration(&on, start, long), Ok(()));
        assert_eq!(check_slot_duration(&UniversityPolicy::default(), start, short), Ok(()));
    }
}
