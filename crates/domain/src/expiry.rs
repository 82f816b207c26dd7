//! Time-to-live policy for authorization requests.
//!
//! Expiry is lazy and read-triggered: every operation that touches a request
//! row applies [`is_live`] before acting. A background sweeper may also flip
//! overdue rows for hygiene, but correctness never depends on it running.

use chrono::{DateTime, TimeDelta, Utc};

/// Fixed lifetime of a pending authorization request.
pub const REQUEST_TTL_SECONDS: i64 = 5 * 60;

/// Computes the expiry instant for a request created at `created_at`.
#[must_use]
pub fn expires_at_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + TimeDelta::seconds(REQUEST_TTL_SECONDS)
}

/// Returns whether a request expiring at `expires_at` is still resolvable
/// at `now`.
#[must_use]
pub fn is_live(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at > now
}
