use chrono::{DateTime, Utc};

use super::Party;
use crate::domain::{Order, OrderStatus, UserId};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to `target` if the transition table allows it.
    Transition {
        party: Party,
        target: OrderStatus,
        at: DateTime<Utc>,
    },
    /// Attaches `code` as the pickup QR unless one was already issued.
    IssueQr { code: String },
    /// Completes a READY_FOR_PICKUP order and records who handed it over.
    ConfirmPickup { vendor_id: UserId, at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub enum OrderActionResult {
    /// Snapshot after a status change.
    Updated(Order),
    /// The QR code now attached to the order.
    QrCode(String),
}
