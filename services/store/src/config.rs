use chrono::Duration;

use identity_core::config::parse_or;

/// Lockout policy applied by the user manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutOptions {
    /// Failed attempts before a user is locked out (default 5).
    /// Env var: `LOCKOUT_MAX_FAILED_ACCESS_ATTEMPTS`.
    pub max_failed_access_attempts: i32,
    /// How long a lockout lasts (default 5 minutes).
    /// Env var: `LOCKOUT_DEFAULT_TIMESPAN_SECS`.
    pub default_lockout_timespan: Duration,
    /// Enable lockout on users at creation (default true).
    /// Env var: `LOCKOUT_ALLOWED_FOR_NEW_USERS`.
    pub allowed_for_new_users: bool,
}

impl Default for LockoutOptions {
    fn default() -> Self {
        Self {
            max_failed_access_attempts: 5,
            default_lockout_timespan: Duration::minutes(5),
            allowed_for_new_users: true,
        }
    }
}

/// Manager options loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityOptions {
    pub lockout: LockoutOptions,
}

impl IdentityOptions {
    pub fn from_env() -> Self {
        let defaults = LockoutOptions::default();
        let timespan = lockout_timespan(
            std::env::var("LOCKOUT_DEFAULT_TIMESPAN_SECS").ok(),
            defaults.default_lockout_timespan,
        );
        Self {
            lockout: LockoutOptions {
                max_failed_access_attempts: parse_or(
                    std::env::var("LOCKOUT_MAX_FAILED_ACCESS_ATTEMPTS").ok(),
                    defaults.max_failed_access_attempts,
                )
                .max(1),
                default_lockout_timespan: timespan,
                allowed_for_new_users: parse_or(
                    std::env::var("LOCKOUT_ALLOWED_FOR_NEW_USERS").ok(),
                    defaults.allowed_for_new_users,
                ),
            },
        }
    }
}

/// Seconds from the environment, or `default` when absent, malformed or
/// beyond what `Duration` can hold. Negative values clamp to zero.
fn lockout_timespan(value: Option<String>, default: Duration) -> Duration {
    let secs = parse_or(value, default.num_seconds()).max(0);
    Duration::try_seconds(secs).unwrap_or(default)
}
