use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use super::{
    FacultyPriorityPolicy, OffPeakRewardPolicy, PolicyError, PolicySource, UniversityPolicy,
    EMERGENCY_SHUTDOWN_KEY, FACULTY_PRIORITY_POLICY_KEY, OFFPEAK_REWARD_POLICY_KEY,
    UNIVERSITY_POLICY_KEY,
};

/// Last values set through this process; served when the source can't be read.
#[derive(Debug, Clone, Default)]
struct Fallbacks {
    university: UniversityPolicy,
    faculty_priority: FacultyPriorityPolicy,
    offpeak_rewards: OffPeakRewardPolicy,
    emergency_shutdown: bool,
}

/// Read-mostly policy access with a cached-default fallback.
#[derive(Clone)]
pub struct PolicyStore {
    source: Arc<dyn PolicySource>,
    fallbacks: Arc<RwLock<Fallbacks>>,
}

impl PolicyStore {
    pub fn new(source: Arc<dyn PolicySource>) -> Self {
        Self {
            source,
            fallbacks: Arc::new(RwLock::new(Fallbacks::default())),
        }
    }

    fn fallbacks(&self) -> Fallbacks {
        match self.fallbacks.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update_fallbacks(&self, apply: impl FnOnce(&mut Fallbacks)) {
        match self.fallbacks.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.source.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Policy source read failed, using fallback");
                None
            }
        }
    }

    fn read_json<P: DeserializeOwned>(&self, key: &str) -> Option<P> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(policy) => Some(policy),
            Err(e) => {
                warn!(key, error = %e, "Malformed policy document, using fallback");
                None
            }
        }
    }

    fn write_json<P: Serialize>(&self, key: &str, policy: &P) {
        let written = serde_json::to_string(policy)
            .map_err(|e| PolicyError::Invalid(e.to_string()))
            .and_then(|raw| self.source.set(key, raw));
        if let Err(e) = written {
            warn!(key, error = %e, "Policy source write failed, kept in-process only");
        }
    }

    pub fn university(&self) -> UniversityPolicy {
        self.read_json(UNIVERSITY_POLICY_KEY)
            .unwrap_or_else(|| self.fallbacks().university)
    }

    pub fn set_university(&self, policy: UniversityPolicy) -> Result<UniversityPolicy, PolicyError> {
        if policy.break_end_hour > 24 || policy.break_start_hour > policy.break_end_hour {
            return Err(PolicyError::Invalid("Break window hours out of range".to_string()));
        }
        self.update_fallbacks(|f| f.university = policy);
        self.write_json(UNIVERSITY_POLICY_KEY, &policy);
        info!(enabled = policy.enabled, "University policy updated");
        Ok(policy)
    }

    pub fn faculty_priority(&self) -> FacultyPriorityPolicy {
        self.read_json(FACULTY_PRIORITY_POLICY_KEY)
            .unwrap_or_else(|| self.fallbacks().faculty_priority)
    }

    pub fn set_faculty_priority(
        &self,
        policy: FacultyPriorityPolicy,
    ) -> Result<FacultyPriorityPolicy, PolicyError> {
        if policy.end_hour > 24 || policy.start_hour > policy.end_hour {
            return Err(PolicyError::Invalid("Priority window hours out of range".to_string()));
        }
        self.update_fallbacks(|f| f.faculty_priority = policy);
        self.write_json(FACULTY_PRIORITY_POLICY_KEY, &policy);
        info!(enabled = policy.enabled, "Faculty priority policy updated");
        Ok(policy)
    }

    pub fn offpeak_rewards(&self) -> OffPeakRewardPolicy {
        self.read_json(OFFPEAK_REWARD_POLICY_KEY)
            .unwrap_or_else(|| self.fallbacks().offpeak_rewards)
    }

    pub fn set_offpeak_rewards(
        &self,
        policy: OffPeakRewardPolicy,
    ) -> Result<OffPeakRewardPolicy, PolicyError> {
        policy.validate()?;
        self.update_fallbacks(|f| f.offpeak_rewards = policy);
        self.write_json(OFFPEAK_REWARD_POLICY_KEY, &policy);
        info!(enabled = policy.enabled, "Off-peak reward policy updated");
        Ok(policy)
    }

    pub fn emergency_shutdown(&self) -> bool {
        match self.read_raw(EMERGENCY_SHUTDOWN_KEY) {
            Some(raw) => is_truthy(&raw),
            None => self.fallbacks().emergency_shutdown,
        }
    }

    pub fn set_emergency_shutdown(&self, enabled: bool) -> bool {
        self.update_fallbacks(|f| f.emergency_shutdown = enabled);
        let value = if enabled { "1" } else { "0" };
        if let Err(e) = self.source.set(EMERGENCY_SHUTDOWN_KEY, value.to_string()) {
            warn!(error = %e, "Policy source write failed, kept in-process only");
        }
        if enabled {
            warn!("Emergency shutdown enabled");
        } else {
            debug!("Emergency shutdown cleared");
        }
        enabled
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
