use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::notifications::{LogNotifier, Notifier};
use crate::policy::{MemoryPolicySource, PolicySource, PolicyStore};
use crate::rewards::{MemoryRewardLedger, RewardLedger};

/// External services the order workflows call out to.
#[derive(Clone)]
pub struct Collaborators {
    pub policy: PolicyStore,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<dyn RewardLedger>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    pub fn new(
        policy_source: Arc<dyn PolicySource>,
        notifier: Arc<dyn Notifier>,
        ledger: Arc<dyn RewardLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy: PolicyStore::new(policy_source),
            notifier,
            ledger,
            clock,
        }
    }

    /// Process-local policy store and ledger, log-only notifications.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryPolicySource::new()),
            Arc::new(LogNotifier),
            Arc::new(MemoryRewardLedger::new()),
            Arc::new(SystemClock),
        )
    }
}
