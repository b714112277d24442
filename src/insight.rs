//! Congestion signals derived from slot occupancy.
//!
//! Everything here is a pure function of `(current, max)`. Signed inputs keep
//! the functions total: a non-positive capacity is a valid (if degenerate) input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization below `LOW_LOAD` (1/2) is LOW.
const LOW_LOAD: (i64, i64) = (1, 2);
/// Utilization below `MEDIUM_LOAD` (4/5) is MEDIUM; anything above is HIGH.
const MEDIUM_LOAD: (i64, i64) = (4, 5);

pub const MIN_EXPRESS_REMAINING_ORDERS: i64 = 2;
pub const BASE_ETA_MINUTES: u32 = 15;
pub const MAX_CONGESTION_DELAY_MINUTES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadLabel {
    Low,
    Medium,
    High,
}

impl fmt::Display for LoadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadLabel::Low => "LOW",
            LoadLabel::Medium => "MEDIUM",
            LoadLabel::High => "HIGH",
        };
        f.write_str(name)
    }
}

/// `current / max < num / den`, without floating point.
fn below(current: i64, max: i64, (num, den): (i64, i64)) -> bool {
    i128::from(current) * i128::from(den) < i128::from(max) * i128::from(num)
}

pub fn load_label(current: i64, max: i64) -> LoadLabel {
    if max <= 0 {
        return LoadLabel::Low;
    }
    if below(current, max, LOW_LOAD) {
        LoadLabel::Low
    } else if below(current, max, MEDIUM_LOAD) {
        LoadLabel::Medium
    } else {
        LoadLabel::High
    }
}

/// Needs at least two free places and a load below HIGH.
pub fn express_pickup_eligible(current: i64, max: i64) -> bool {
    if max <= 0 {
        return false;
    }
    if max.saturating_sub(current) < MIN_EXPRESS_REMAINING_ORDERS {
        return false;
    }
    matches!(load_label(current, max), LoadLabel::Low | LoadLabel::Medium)
}

/// Base preparation time plus up to ten minutes scaled by utilization.
pub fn eta_minutes(current: i64, max: i64) -> u32 {
    if max <= 0 || current <= 0 {
        return BASE_ETA_MINUTES;
    }
    let scaled = i128::from(current) * i128::from(MAX_CONGESTION_DELAY_MINUTES) / i128::from(max);
    let delay = scaled.clamp(0, i128::from(MAX_CONGESTION_DELAY_MINUTES)) as u32;
    BASE_ETA_MINUTES + delay
}
