//! Access key model: tier resolution and sliding-window quota tracking.
//!
//! API keys are stored as SHA-256 hashes. Every authenticated request
//! resolves the presented key to an [`AccessKey`], advances its usage
//! counter (or resets the window), and persists the result — including on
//! requests that are ultimately rejected for quota, so hammering past the
//! limit keeps counting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller access level, ordered by privilege.
///
/// The `Ord` derivation respects variant declaration order
/// (`Developer < Premium < Moderator`), which enables `>=` comparisons in
/// the policy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// Free tier: paginated listings, daily request limit, queued writes.
    Developer,
    /// Paid tier: no daily limit, unpaginated listings, still queued writes.
    Premium,
    /// Trusted tier: writes apply directly, moderation endpoints allowed.
    Moderator,
}

impl AccessTier {
    /// Numeric level as stored in the database.
    pub fn level(self) -> i32 {
        match self {
            AccessTier::Developer => 0,
            AccessTier::Premium => 10,
            AccessTier::Moderator => 99,
        }
    }

    /// Map a stored numeric level onto a tier.
    ///
    /// Levels between the named values resolve downward, so a legacy level
    /// of 1 is still a Developer and anything at or above 99 moderates.
    pub fn from_level(level: i32) -> Self {
        if level >= AccessTier::Moderator.level() {
            AccessTier::Moderator
        } else if level >= AccessTier::Premium.level() {
            AccessTier::Premium
        } else {
            AccessTier::Developer
        }
    }
}

/// Quota limits applied to Developer-tier keys, derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct QuotaSettings {
    /// Requests permitted per window for limited tiers.
    pub daily_request_limit: i64,
    /// Length of the rolling window.
    pub window: Duration,
}

/// Result of registering one request against a key's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaCheck {
    /// Request admitted. `remaining` is `None` for unlimited tiers.
    Allowed { remaining: Option<i64> },
    /// Request over the limit for this window. The counter increment that
    /// caused the overflow is still persisted by the caller.
    Exceeded,
}

/// Represents an access key record from the store.
///
/// Keys are never deleted; tier changes happen out-of-band (the
/// `insert_access_key` store operation is that surface, used by bootstrap
/// and tests).
#[derive(Debug, Clone)]
pub struct AccessKey {
    /// Unique identifier for this key
    pub id: Uuid,

    /// SHA-256 hex digest of the actual API key (64 hex characters)
    pub key_hash: String,

    /// Resolved access tier
    pub tier: AccessTier,

    /// Requests seen in the current window, including this one
    pub request_count_in_window: i64,

    /// When the current window opened
    pub window_started_at: DateTime<Utc>,

    /// When the key was issued
    pub created_at: DateTime<Utc>,
}

impl AccessKey {
    /// Advance the sliding window for one inbound request.
    ///
    /// If the window has lapsed the counter resets and this request counts
    /// as 1; otherwise the counter increments. The mutation always sticks —
    /// callers persist the updated state whether or not the request is
    /// admitted.
    pub fn register_request(&mut self, now: DateTime<Utc>, settings: &QuotaSettings) -> QuotaCheck {
        if now - self.window_started_at > settings.window {
            self.request_count_in_window = 1;
            self.window_started_at = now;
        } else {
            self.request_count_in_window += 1;
        }

        if self.tier >= AccessTier::Premium {
            return QuotaCheck::Allowed { remaining: None };
        }

        if self.request_count_in_window > settings.daily_request_limit {
            QuotaCheck::Exceeded
        } else {
            QuotaCheck::Allowed {
                remaining: Some(settings.daily_request_limit - self.request_count_in_window),
            }
        }
    }
}
