use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::idempotency::MAX_IDEMPOTENCY_TTL;
use crate::lock::{DEFAULT_LOCK_TTL, MAX_LOCK_TTL};

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Mailbox size of every resource actor.
    pub actor_buffer_size: usize,
    pub slot_lock_ttl: Duration,
    pub idempotency_ttl: Duration,
    pub points_per_rupee: f64,
    /// Give a cancelled order's place back to its slot.
    pub release_slot_on_cancel: bool,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            actor_buffer_size: 100,
            slot_lock_ttl: DEFAULT_LOCK_TTL,
            idempotency_ttl: Duration::from_secs(3600),
            points_per_rupee: 1.0,
            release_slot_on_cancel: true,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            actor_buffer_size: try_load("ACTOR_BUFFER_SIZE", defaults.actor_buffer_size),
            slot_lock_ttl: load_ttl("SLOT_LOCK_TTL_SECS", defaults.slot_lock_ttl, MAX_LOCK_TTL),
            idempotency_ttl: load_ttl(
                "IDEMPOTENCY_TTL_SECS",
                defaults.idempotency_ttl,
                MAX_IDEMPOTENCY_TTL,
            ),
            points_per_rupee: try_load("POINTS_PER_RUPEE", defaults.points_per_rupee),
            release_slot_on_cancel: load_flag("RELEASE_SLOT_ON_CANCEL", defaults.release_slot_on_cancel),
            log_json: load_flag("LOG_JSON", defaults.log_json),
        }
    }
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn load_ttl(key: &str, default: Duration, max: Duration) -> Duration {
    validate_ttl(key, try_load(key, default.as_secs()), default, max)
}

/// Zero falls back to `default`; anything above `max` is clamped to it.
fn validate_ttl(key: &str, secs: u64, default: Duration, max: Duration) -> Duration {
    if secs == 0 {
        warn!("{key} must be positive, using default: {}s", default.as_secs());
        return default;
    }
    let ttl = Duration::from_secs(secs);
    if ttl > max {
        warn!("{key} of {secs}s is above the {}s ceiling, clamping", max.as_secs());
        return max;
    }
    ttl
}

fn load_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            warn!("Invalid {key} value {raw:?}, using default: {default}");
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.slot_lock_ttl, Duration::from_secs(5));
        assert_eq!(config.idempotency_ttl, Duration::from_secs(3600));
        assert!(config.release_slot_on_cancel);
    }

    #[test]
    fn test_unparseable_value_uses_default() {
        env::set_var("PICKUP_TEST_BUFFER", "lots");
        assert_eq!(try_load("PICKUP_TEST_BUFFER", 7usize), 7);
        env::set_var("PICKUP_TEST_BUFFER", "12");
        assert_eq!(try_load("PICKUP_TEST_BUFFER", 7usize), 12);
        env::remove_var("PICKUP_TEST_BUFFER");
    }

    #[test]
    fn test_ttl_validation() {
        let default = Duration::from_secs(5);
        let max = Duration::from_secs(300);
        assert_eq!(validate_ttl("T", 0, default, max), default);
        assert_eq!(validate_ttl("T", 30, default, max), Duration::from_secs(30));
        assert_eq!(validate_ttl("T", u64::MAX, default, max), max);
    }

    #[test]
    fn test_zero_lock_ttl_from_env_falls_back() {
        env::set_var("PICKUP_TEST_LOCK_TTL", "0");
        assert_eq!(load_ttl("PICKUP_TEST_LOCK_TTL", DEFAULT_LOCK_TTL, MAX_LOCK_TTL), DEFAULT_LOCK_TTL);
        env::set_var("PICKUP_TEST_LOCK_TTL", "18446744073709551615");
        assert_eq!(load_ttl("PICKUP_TEST_LOCK_TTL", DEFAULT_LOCK_TTL, MAX_LOCK_TTL), MAX_LOCK_TTL);
        env::remove_var("PICKUP_TEST_LOCK_TTL");
    }
}
