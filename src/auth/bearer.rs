//! Bearer credential wrapper and the ordered fallback candidate pool.

// self
use crate::_prelude::*;

/// Public bearer embedded in the official web client; the default active credential.
pub const BEARER_WEB: &str = "AAAAAAAAAAAAAAAAAAAAAPYXBAAAAAAACLXUNDekMxqa8h%2F40K4moUkGsoc%3DTYfbDKbT3jJPCEVnMYqilB28NHfOPqkca3qaAxGfsyKCs0wRbw";
/// Alternate public bearers tried, in order, when the active credential is rejected.
pub const BEARER_FALLBACKS: [&str; 2] = [
	"AAAAAAAAAAAAAAAAAAAAAFQODgEAAAAAVHTp76lzh3rFzcHbmHVvQxYYpTw%3DckAlMINMjmCwxUcaXbAN4XqJVdgMJaHqNOFgPMK0zN1qLqLQCF",
	"AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA",
];

/// Redacted bearer credential keeping the raw token out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a raw bearer string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the wrapped token is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for BearerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Ordered bearer candidates consulted during guest activation and 401 fallback.
///
/// Order defines precedence. Duplicates and empty entries are skipped at use time,
/// so the pool can safely repeat the active credential.
#[derive(Clone, Debug)]
pub struct BearerPool {
	candidates: Vec<BearerToken>,
}
impl BearerPool {
	/// Creates a pool from the provided candidates, keeping their order.
	pub fn new(candidates: impl IntoIterator<Item = BearerToken>) -> Self {
		Self { candidates: candidates.into_iter().collect() }
	}

	/// Returns the candidates to try for a guest activation round: the active
	/// credential first, then the pool in order, with empties and duplicates removed.
	pub fn activation_order(&self, active: &BearerToken) -> Vec<BearerToken> {
		let mut ordered = Vec::with_capacity(self.candidates.len() + 1);

		for candidate in [active].into_iter().chain(self.candidates.iter()) {
			if candidate.is_empty() || ordered.contains(candidate) {
				continue;
			}

			ordered.push(candidate.clone());
		}

		ordered
	}

	/// Returns the first pool candidate distinct from `active`, if any.
	pub fn fallback_for(&self, active: &BearerToken) -> Option<BearerToken> {
		self.candidates
			.iter()
			.find(|candidate| !candidate.is_empty() && *candidate != active)
			.cloned()
	}

	/// Iterates the configured candidates in precedence order.
	pub fn iter(&self) -> impl Iterator<Item = &BearerToken> {
		self.candidates.iter()
	}

	/// Returns true when no candidates are configured.
	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}
}
impl Default for BearerPool {
	fn default() -> Self {
		Self::new(
			BEARER_FALLBACKS.into_iter().chain([BEARER_WEB]).map(BearerToken::new),
		)
	}
}
