use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::UserId;
use crate::insight::{self, LoadLabel};

pub type SlotId = u64;

/// Occupancy classification stored on the slot.
///
/// Distinct from [`LoadLabel`]: the two use different thresholds and feed
/// different surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Limited,
    Full,
}

impl SlotStatus {
    /// FULL at or above capacity, LIMITED from 70% of capacity, else AVAILABLE.
    pub fn derive(current_orders: u32, max_orders: u32) -> Self {
        let current = u64::from(current_orders);
        let max = u64::from(max_orders);
        if current >= max {
            SlotStatus::Full
        } else if current * 10 >= max * 7 {
            SlotStatus::Limited
        } else {
            SlotStatus::Available
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotStatus::Available => "available",
            SlotStatus::Limited => "limited",
            SlotStatus::Full => "full",
        };
        f.write_str(name)
    }
}

/// A vendor's pickup window with a fixed order capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub id: SlotId,
    pub vendor_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_orders: u32,
    pub current_orders: u32,
    pub status: SlotStatus,
}

impl Slot {
    pub fn remaining(&self) -> u32 {
        self.max_orders.saturating_sub(self.current_orders)
    }

    /// Hour of day (UTC) the window opens; policy windows are matched against it.
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }

    pub fn load_label(&self) -> LoadLabel {
        insight::load_label(self.current_orders.into(), self.max_orders.into())
    }

    pub fn express_pickup_eligible(&self) -> bool {
        insight::express_pickup_eligible(self.current_orders.into(), self.max_orders.into())
    }
}

/// Payload for publishing a new slot.
#[derive(Debug, Clone)]
pub struct SlotCreate {
    pub vendor_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_orders: u32,
}

/// Occupancy write issued by the capacity manager while it holds the slot lock.
#[derive(Debug, Clone, Copy)]
pub struct SlotPatch {
    pub current_orders: u32,
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingReceipt {
    pub slot_id: SlotId,
    pub current_orders: u32,
    pub status: SlotStatus,
    pub load_label: LoadLabel,
    pub express_pickup_eligible: bool,
}

impl From<&Slot> for BookingReceipt {
    fn from(slot: &Slot) -> Self {
        Self {
            slot_id: slot.id,
            current_orders: slot.current_orders,
            status: slot.status,
            load_label: slot.load_label(),
            express_pickup_eligible: slot.express_pickup_eligible(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_derivation_is_total() {
        for max in 0..=40u32 {
            for current in 0..=max {
                let status = SlotStatus::derive(current, max);
                let expected = if current >= max {
                    SlotStatus::Full
                } else if f64::from(current) * 10.0 >= f64::from(max) * 7.0 {
                    SlotStatus::Limited
                } else {
                    SlotStatus::Available
                };
                assert_eq!(status, expected, "current={current} max={max}");
            }
        }
    }

    #[test]
    fn test_zero_capacity_is_full() {
        assert_eq!(SlotStatus::derive(0, 0), SlotStatus::Full);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SlotStatus::Limited).unwrap(), "\"limited\"");
    }
}
