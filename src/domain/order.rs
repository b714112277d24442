use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MenuItemId, SlotId, UserId};
use crate::insight::LoadLabel;

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    ReadyForPickup,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::ReadyForPickup,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A line item as requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

impl OrderItemRequest {
    pub fn new(menu_item_id: MenuItemId, quantity: u32) -> Self {
        Self { menu_item_id, quantity }
    }
}

/// A priced line item. `unit_price` is captured when the order is placed and
/// never follows later menu changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub unit_price: i64,
}

impl OrderLine {
    pub fn subtotal(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }

    pub fn total(lines: &[OrderLine]) -> i64 {
        lines.iter().map(OrderLine::subtotal).fold(0, i64::saturating_add)
    }
}

/// One row of the append-only status log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderHistory {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// Represents a user's purchase against one pickup slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub vendor_id: UserId,
    pub slot_id: SlotId,
    pub status: OrderStatus,
    /// In paise.
    pub total_amount: i64,
    pub items: Vec<OrderLine>,
    pub eta_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub qr_code: Option<String>,
    pub pickup_confirmed_at: Option<DateTime<Utc>>,
    pub pickup_confirmed_by: Option<UserId>,
    pub history: Vec<OrderHistory>,
}

impl Order {
    /// Moves to `status` and appends the matching history row in one step.
    pub(crate) fn record(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.status = status;
        self.history.push(OrderHistory {
            order_id: self.id,
            status,
            changed_at: at,
        });
    }
}

/// Payload for creating a new order. The vendor is copied from the slot.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub vendor_id: UserId,
    pub slot_id: SlotId,
    pub items: Vec<OrderLine>,
    pub eta_minutes: u32,
    pub created_at: DateTime<Utc>,
}

/// Response to a successful order placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub eta_minutes: u32,
    pub pickup_load_label: LoadLabel,
    pub express_pickup_eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEta {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub estimated_ready_at: DateTime<Utc>,
    pub is_delayed: bool,
    pub delay_minutes: i64,
    pub pickup_load_label: LoadLabel,
    pub express_pickup_eligible: bool,
}
