//! The permission matrix: `(party, current status) -> allowed targets`.

use std::fmt;

use super::OrderError;
use crate::domain::OrderId;
use crate::domain::OrderStatus::{self, *};

/// Who is asking for the transition, relative to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The user who placed the order.
    Customer,
    /// The vendor the order's slot belongs to.
    Vendor,
}

impl Party {
    pub const ALL: [Party; 2] = [Party::Customer, Party::Vendor];
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Customer => f.write_str("customer"),
            Party::Vendor => f.write_str("vendor"),
        }
    }
}

/// An order that is ready for pickup has no entry here: it only completes
/// through [`check_pickup`].
pub fn allowed_targets(party: Party, from: OrderStatus) -> &'static [OrderStatus] {
    match (party, from) {
        (Party::Customer, Pending) => &[Cancelled],
        (Party::Vendor, Pending) => &[Confirmed],
        (Party::Vendor, Confirmed) => &[ReadyForPickup, Completed],
        _ => &[],
    }
}

/// Whether `party` may ever move an order into `target`.
pub fn can_reach(party: Party, target: OrderStatus) -> bool {
    OrderStatus::ALL
        .iter()
        .any(|from| allowed_targets(party, *from).contains(&target))
}

fn rejection(party: Party, target: OrderStatus) -> &'static str {
    match (party, target) {
        (Party::Customer, Cancelled) => "Order cannot be cancelled",
        (Party::Vendor, Confirmed) => "Only pending orders can be confirmed",
        (Party::Vendor, Completed) => "Order must be confirmed before completion",
        (Party::Vendor, ReadyForPickup) => "Only confirmed orders can be marked ready",
        _ => "Transition not allowed",
    }
}

pub fn check(party: Party, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if allowed_targets(party, from).contains(&to) {
        return Ok(());
    }
    if !can_reach(party, to) {
        return Err(OrderError::Forbidden(format!("A {party} cannot move an order to {to}")));
    }
    Err(OrderError::InvalidTransition(rejection(party, to)))
}

/// A scanned pickup code completes the order only from `ReadyForPickup`.
pub fn check_pickup(order_id: OrderId, from: OrderStatus) -> Result<(), OrderError> {
    if from == ReadyForPickup {
        Ok(())
    } else {
        Err(OrderError::NotReadyForPickup(order_id))
    }
}
