use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::PolicyError;

/// Key-value backend holding the policy documents.
pub trait PolicySource: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PolicyError>;
    fn set(&self, key: &str, value: String) -> Result<(), PolicyError>;
}

/// In-process source. `set_available(false)` simulates an outage of the
/// backing store.
#[derive(Debug)]
pub struct MemoryPolicySource {
    values: DashMap<String, String>,
    available: AtomicBool,
}

impl Default for MemoryPolicySource {
    fn default() -> Self {
        Self {
            values: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryPolicySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), PolicyError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PolicyError::SourceUnavailable("memory source offline".to_string()))
        }
    }
}

impl PolicySource for MemoryPolicySource {
    fn get(&self, key: &str) -> Result<Option<String>, PolicyError> {
        self.ensure_available()?;
        Ok(self.values.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), PolicyError> {
        self.ensure_available()?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
