//! Reward accrual on order completion.
//!
//! The ledger is an external collaborator: accrual is one-way and a failed
//! write is logged, never retried, and never undoes the completion.

use chrono::{DateTime, Timelike, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Order, OrderId, UserId};
use crate::policy::{is_hour_in_window, OffPeakRewardPolicy};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Reward ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    OrderCompletion,
    OffPeakBonus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardEntry {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub kind: RewardKind,
    pub points: f64,
    pub description: String,
    pub awarded_at: DateTime<Utc>,
}

pub trait RewardLedger: Send + Sync {
    fn award(&self, entry: RewardEntry) -> Result<(), LedgerError>;
}

/// Points owed for a completed order: one rate per rupee spent, plus the
/// off-peak bonus when the order was created inside the bonus window.
pub fn completion_rewards(
    order: &Order,
    points_per_rupee: f64,
    offpeak: &OffPeakRewardPolicy,
    awarded_at: DateTime<Utc>,
) -> Vec<RewardEntry> {
    let rupees = order.total_amount as f64 / 100.0;
    let points = rupees * points_per_rupee;
    let mut entries = vec![RewardEntry {
        user_id: order.user_id,
        order_id: order.id,
        kind: RewardKind::OrderCompletion,
        points,
        description: format!("Earned {points} points for order completion"),
        awarded_at,
    }];

    let created_hour = order.created_at.hour();
    if offpeak.enabled
        && offpeak.bonus_points_per_order > 0.0
        && is_hour_in_window(created_hour, offpeak.start_hour, offpeak.end_hour)
    {
        entries.push(RewardEntry {
            user_id: order.user_id,
            order_id: order.id,
            kind: RewardKind::OffPeakBonus,
            points: offpeak.bonus_points_per_order,
            description: format!("Off-peak bonus for order #{}", order.id),
            awarded_at,
        });
    }
    entries
}

/// Writes every entry, logging failures. Returns how many landed.
pub fn accrue(ledger: &dyn RewardLedger, entries: Vec<RewardEntry>) -> usize {
    let mut written = 0;
    for entry in entries {
        let (order_id, kind, points) = (entry.order_id, entry.kind, entry.points);
        match ledger.award(entry) {
            Ok(()) => {
                info!(order_id, ?kind, points, "Reward points awarded");
                written += 1;
            }
            Err(e) => warn!(order_id, ?kind, error = %e, "Reward accrual failed"),
        }
    }
    written
}

/// In-process ledger keeping balances and the transaction log.
#[derive(Debug, Default)]
pub struct MemoryRewardLedger {
    balances: DashMap<UserId, f64>,
    log: Mutex<Vec<RewardEntry>>,
    offline: AtomicBool,
}

impl MemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn balance(&self, user_id: UserId) -> f64 {
        self.balances.get(&user_id).map(|b| *b).unwrap_or(0.0)
    }

    pub fn entries(&self) -> Vec<RewardEntry> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RewardLedger for MemoryRewardLedger {
    fn award(&self, entry: RewardEntry) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger offline".to_string()));
        }
        *self.balances.entry(entry.user_id).or_insert(0.0) += entry.points;
        self.log
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger log poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
