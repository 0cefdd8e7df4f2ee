//! Canonical timeline model extracted from GraphQL payloads.

mod conversation;
pub(crate) use conversation::ConversationPayload;

// crates.io
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

const CREATED_AT_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
	"[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);

/// A canonical tweet extracted from a timeline payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tweet {
	/// Tweet identifier.
	pub id: String,
	/// Identifier of the conversation the tweet belongs to.
	pub conversation_id: String,
	/// Identifier of the authoring account.
	pub author_id: String,
	/// Creation time parsed from the legacy timestamp format.
	pub created_at: OffsetDateTime,
	/// Full tweet text.
	pub text: String,
	/// Authoring account.
	pub author: Profile,
}

/// A canonical account profile extracted from a timeline payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
	/// Account identifier.
	pub id: String,
	/// Account handle without the leading `@`.
	pub handle: String,
	/// Display name.
	pub display_name: String,
}

/// Parses the legacy timestamp format, e.g. `Mon Jan 02 15:04:05 -0700 2006`.
pub(crate) fn parse_created_at(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
	OffsetDateTime::parse(raw, CREATED_AT_FORMAT)
}
