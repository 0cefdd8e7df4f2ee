//! Guest token model with the frontend's three-hour freshness window.

// self
use crate::_prelude::*;

/// Lifetime of an activated guest token; tokens at or past this age must be replaced.
pub const GUEST_TOKEN_TTL: Duration = Duration::hours(3);

/// Guest credential issued by the activation endpoint, stamped at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuestToken {
	value: String,
	created_at: OffsetDateTime,
}
impl GuestToken {
	/// Wraps a freshly activated guest token, stamping it with the current time.
	pub fn issued_now(value: impl Into<String>) -> Self {
		Self::issued_at(value, OffsetDateTime::now_utc())
	}

	/// Wraps a guest token with an explicit activation instant, e.g. when restoring
	/// a previously captured session.
	pub fn issued_at(value: impl Into<String>, created_at: OffsetDateTime) -> Self {
		Self { value: value.into(), created_at }
	}

	/// Returns the raw guest token value.
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Returns the activation instant.
	pub fn created_at(&self) -> OffsetDateTime {
		self.created_at
	}

	/// Returns true while the token is strictly younger than [`GUEST_TOKEN_TTL`].
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now - self.created_at < GUEST_TOKEN_TTL
	}

	/// Freshness check against the current wall clock.
	pub fn is_fresh(&self) -> bool {
		self.is_fresh_at(OffsetDateTime::now_utc())
	}
}
