//! Progressive account lockout policy.
//!
//! The counter itself lives in the account row and is updated atomically by
//! [`AccountRepository::record_failed_login`](crate::db::AccountRepository::record_failed_login);
//! this module only holds the thresholds and the derived time arithmetic.

use chrono::{DateTime, Duration, Utc};

use crate::config::AuthConfig;
use crate::Result;

/// Default failed attempts before locking.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Default lock duration in seconds.
pub const LOCKOUT_DURATION_SECS: i64 = 15 * 60;

/// Lockout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts that trigger a lock.
    pub max_attempts: u32,
    /// How long a lock lasts.
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            lock_duration: Duration::seconds(LOCKOUT_DURATION_SECS),
        }
    }
}

impl LockoutPolicy {
    /// Build the policy from configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            max_attempts: config.max_login_attempts,
            lock_duration: config.lockout()?,
        })
    }

    /// Lock duration in whole minutes, rounded up.
    pub fn lock_minutes(&self) -> i64 {
        ceil_minutes(self.lock_duration)
    }
}

/// Minutes left on a lock, rounded up. Zero if the lock has passed.
pub fn remaining_minutes(lock_until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if lock_until <= now {
        return 0;
    }
    ceil_minutes(lock_until - now)
}

fn ceil_minutes(d: Duration) -> i64 {
    let ms = d.num_milliseconds().max(0);
    (ms + 59_999) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::from_millis;

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.lock_duration, Duration::minutes(15));
        assert_eq!(policy.lock_minutes(), 15);
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            max_login_attempts: 3,
            lockout_secs: 90,
            ..AuthConfig::default()
        };
        let policy = LockoutPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.lock_minutes(), 2);

        let oversized = AuthConfig {
            lockout_secs: u64::MAX,
            ..AuthConfig::default()
        };
        assert!(LockoutPolicy::from_config(&oversized).is_err());
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let now = from_millis(1_700_000_000_000);
        let until = now + Duration::minutes(15);

        assert_eq!(remaining_minutes(until, now), 15);
        assert_eq!(remaining_minutes(until, now + Duration::seconds(1)), 15);
        assert_eq!(remaining_minutes(until, now + Duration::minutes(14)), 1);
        assert_eq!(
            remaining_minutes(until, now + Duration::minutes(14) + Duration::seconds(59)),
            1
        );
        assert_eq!(remaining_minutes(until, until), 0);
        assert_eq!(remaining_minutes(until, until + Duration::minutes(1)), 0);
    }
}
