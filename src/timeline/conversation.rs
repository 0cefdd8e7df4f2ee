//! Wire model for `TweetDetail` conversation payloads.
//!
//! The payload shape varies between deployments: instructions are tagged
//! `TimelineAddEntry` or `TimelineAddEntries` and carry their entries under a
//! singular `entry` field, a plural `entries` field, or both. Everything here
//! decodes leniently so a malformed instruction or entry drops alone instead of
//! failing the payload.

// crates.io
use serde::de::IgnoredAny;
// self
use crate::{
	_prelude::*,
	error::GraphQlError,
	timeline::{Profile, Tweet, parse_created_at},
};

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationPayload {
	#[serde(default)]
	errors: Vec<GraphQlMessage>,
	data: Option<ConversationData>,
}
impl ConversationPayload {
	/// Normalizes the payload into tweets, in timeline order.
	///
	/// A non-empty `errors` array wins over any `data` the response also carries.
	pub(crate) fn into_tweets(self) -> Result<Vec<Tweet>, GraphQlError> {
		if !self.errors.is_empty() {
			return Err(GraphQlError {
				messages: self.errors.into_iter().map(|error| error.message).collect(),
			});
		}

		let instructions = self
			.data
			.and_then(|data| data.threaded_conversation_with_injections_v2)
			.map(|timeline| timeline.instructions)
			.unwrap_or_default();

		Ok(instructions
			.into_iter()
			.filter_map(Lenient::into_option)
			.flat_map(Instruction::into_entries)
			.filter_map(TimelineEntry::into_tweet)
			.collect())
	}
}

#[derive(Debug, Deserialize)]
struct GraphQlMessage {
	#[serde(default)]
	message: String,
}

#[derive(Debug, Deserialize)]
struct ConversationData {
	threaded_conversation_with_injections_v2: Option<ConversationTimeline>,
}

#[derive(Debug, Deserialize)]
struct ConversationTimeline {
	#[serde(default)]
	instructions: Vec<Lenient<Instruction>>,
}

// Untagged so a failed element decode falls through to the ignore arm instead of
// failing the payload around it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
	Value(T),
	Invalid(IgnoredAny),
}
impl<T> Lenient<T> {
	fn into_option(self) -> Option<T> {
		match self {
			Self::Value(value) => Some(value),
			Self::Invalid(_) => None,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Instruction {
	#[serde(rename = "TimelineAddEntry")]
	AddEntry(InstructionEntries),
	#[serde(rename = "TimelineAddEntries")]
	AddEntries(InstructionEntries),
	#[serde(other)]
	Unknown,
}
impl Instruction {
	// Both tags accept both field shapes; the singular entry sorts first.
	fn into_entries(self) -> Vec<TimelineEntry> {
		match self {
			Self::AddEntry(fields) | Self::AddEntries(fields) => {
				let mut entries = Vec::new();

				if let Some(entry) = fields.entry.and_then(Lenient::into_option) {
					entries.push(entry);
				}
				if let Some(more) = fields.entries {
					entries.extend(more.into_iter().filter_map(Lenient::into_option));
				}

				entries
			},
			Self::Unknown => Vec::new(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct InstructionEntries {
	entry: Option<Lenient<TimelineEntry>>,
	entries: Option<Vec<Lenient<TimelineEntry>>>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
	content: Option<EntryContent>,
}
impl TimelineEntry {
	fn into_tweet(self) -> Option<Tweet> {
		self.content?.item_content?.tweet_results?.result?.into_tweet()
	}
}

#[derive(Debug, Deserialize)]
struct EntryContent {
	#[serde(rename = "itemContent")]
	item_content: Option<ItemContent>,
}

#[derive(Debug, Deserialize)]
struct ItemContent {
	tweet_results: Option<TweetResults>,
}

#[derive(Debug, Deserialize)]
struct TweetResults {
	result: Option<TweetResult>,
}

#[derive(Debug, Deserialize)]
struct TweetResult {
	// Set on visibility-limited results, wrapping the real one a level down.
	tweet: Option<Box<TweetResult>>,
	legacy: Option<TweetLegacy>,
	core: Option<TweetCore>,
}
impl TweetResult {
	fn into_tweet(self) -> Option<Tweet> {
		let result = match self.tweet {
			Some(inner) => *inner,
			None => self,
		};
		let legacy = result.legacy?;
		let author = result.core?.user_results?.result?.into_profile()?;

		if legacy.id_str.is_empty() {
			return None;
		}

		let created_at = parse_created_at(&legacy.created_at).ok()?;
		let author_id =
			if legacy.user_id_str.is_empty() { author.id.clone() } else { legacy.user_id_str };

		Some(Tweet {
			id: legacy.id_str,
			conversation_id: legacy.conversation_id_str,
			author_id,
			created_at,
			text: legacy.full_text,
			author,
		})
	}
}

#[derive(Debug, Deserialize)]
struct TweetLegacy {
	#[serde(default)]
	id_str: String,
	#[serde(default)]
	conversation_id_str: String,
	#[serde(default)]
	user_id_str: String,
	#[serde(default)]
	created_at: String,
	#[serde(default)]
	full_text: String,
}

#[derive(Debug, Deserialize)]
struct TweetCore {
	user_results: Option<UserResults>,
}

#[derive(Debug, Deserialize)]
struct UserResults {
	result: Option<UserResult>,
}

#[derive(Debug, Deserialize)]
struct UserResult {
	rest_id: Option<String>,
	legacy: Option<UserLegacy>,
}
impl UserResult {
	fn into_profile(self) -> Option<Profile> {
		let legacy = self.legacy?;
		let id = match self.rest_id {
			Some(rest_id) if !rest_id.is_empty() => rest_id,
			_ => legacy.id_str,
		};

		if id.is_empty() || legacy.screen_name.is_empty() {
			return None;
		}

		Some(Profile { id, handle: legacy.screen_name, display_name: legacy.name })
	}
}

#[derive(Debug, Deserialize)]
struct UserLegacy {
	#[serde(default)]
	id_str: String,
	#[serde(default)]
	screen_name: String,
	#[serde(default)]
	name: String,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::{Value, json};
	use time::macros::datetime;
	// self
	use super::*;

	fn tweet_entry(id: &str, text: &str) -> Value {
		json!({
			"content": {
				"itemContent": {
					"tweet_results": {
						"result": {
							"rest_id": id,
							"core": {
								"user_results": {
									"result": {
										"rest_id": "1209344563589992448",
										"legacy": {
											"id_str": "1209344563589992448",
											"name": "Example Account",
											"screen_name": "example"
										}
									}
								}
							},
							"legacy": {
								"conversation_id_str": id,
								"created_at": "Wed Oct 10 20:19:24 +0000 2018",
								"full_text": text,
								"id_str": id,
								"user_id_str": "1209344563589992448"
							}
						}
					}
				}
			}
		})
	}

	fn payload_with_instructions(instructions: Value) -> ConversationPayload {
		serde_json::from_value(json!({
			"data": {
				"threaded_conversation_with_injections_v2": { "instructions": instructions }
			}
		}))
		.expect("Payload fixture should decode.")
	}

	#[test]
	fn singular_and_plural_entry_shapes_are_equivalent() {
		let singular = payload_with_instructions(json!([
			{ "type": "TimelineAddEntry", "entry": tweet_entry("1", "hello") }
		]))
		.into_tweets()
		.expect("Payload should normalize.");
		let plural = payload_with_instructions(json!([
			{ "type": "TimelineAddEntries", "entries": [tweet_entry("1", "hello")] }
		]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(singular, plural);
		assert_eq!(singular.len(), 1);
		assert_eq!(singular[0].id, "1");
		assert_eq!(singular[0].text, "hello");
		assert_eq!(singular[0].created_at, datetime!(2018-10-10 20:19:24 UTC));
		assert_eq!(singular[0].author.handle, "example");
	}

	#[test]
	fn both_field_shapes_merge_with_the_singular_entry_first() {
		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entry": tweet_entry("1", "first"),
			"entries": [tweet_entry("2", "second"), tweet_entry("3", "third")]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");
		let ids = tweets.iter().map(|tweet| tweet.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, ["1", "2", "3"]);
	}

	#[test]
	fn unknown_instruction_types_are_ignored() {
		let tweets = payload_with_instructions(json!([
			{ "type": "TimelineClearCache" },
			{ "type": "TimelineTerminateTimeline", "direction": "Top" },
			{ "type": "TimelineAddEntries", "entries": [tweet_entry("1", "kept")] }
		]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "1");
	}

	#[test]
	fn entries_without_tweet_results_are_skipped() {
		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entries": [
				{
					"content": {
						"cursorType": "Bottom",
						"entryType": "TimelineTimelineCursor",
						"value": "ZAAAAPAxHBlWhsC444"
					}
				},
				tweet_entry("1", "kept")
			]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "1");
	}

	#[test]
	fn visibility_wrapped_results_are_unwrapped_one_level() {
		let inner = tweet_entry("1", "wrapped")["content"]["itemContent"]["tweet_results"]
			["result"]
			.clone();
		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entries": [{
				"content": {
					"itemContent": {
						"tweet_results": {
							"result": {
								"limitedActionResults": { "limited_actions": [] },
								"tweet": inner
							}
						}
					}
				}
			}]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].text, "wrapped");
	}

	#[test]
	fn graphql_errors_win_over_data() {
		let payload: ConversationPayload = serde_json::from_value(json!({
			"data": { "threaded_conversation_with_injections_v2": null },
			"errors": [
				{ "code": 144, "message": "No status found with that ID." },
				{ "message": "Timeout" }
			]
		}))
		.expect("Payload fixture should decode.");
		let err = payload.into_tweets().expect_err("Errors should take precedence.");

		assert_eq!(err.to_string(), "graphql error: No status found with that ID., Timeout");
	}

	#[test]
	fn malformed_entries_drop_without_poisoning_siblings() {
		let mut broken = tweet_entry("1", "broken");

		broken["content"]["itemContent"]["tweet_results"]["result"]["legacy"]["created_at"] =
			json!("yesterday-ish");

		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entries": [broken, tweet_entry("2", "kept")]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "2");
	}

	#[test]
	fn null_entry_elements_drop_alone() {
		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entries": [null, tweet_entry("1", "kept")]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "1");
	}

	#[test]
	fn malformed_singular_entries_drop_alone() {
		let tweets = payload_with_instructions(json!([{
			"type": "TimelineAddEntries",
			"entry": "not-an-entry",
			"entries": [tweet_entry("2", "kept")]
		}]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "2");
	}

	#[test]
	fn tagless_instructions_are_ignored() {
		let tweets = payload_with_instructions(json!([
			{ "entries": [tweet_entry("9", "untyped")] },
			{ "type": "TimelineAddEntry", "entry": tweet_entry("1", "kept") }
		]))
		.into_tweets()
		.expect("Payload should normalize.");

		assert_eq!(tweets.len(), 1);
		assert_eq!(tweets[0].id, "1");
	}

	#[test]
	fn missing_timeline_normalizes_to_no_tweets() {
		let payload: ConversationPayload = serde_json::from_value(json!({ "data": null }))
			.expect("Payload fixture should decode.");

		assert!(payload.into_tweets().expect("Payload should normalize.").is_empty());
	}

	#[test]
	fn author_id_falls_back_to_the_profile_id() {
		let mut entry = tweet_entry("1", "text");

		entry["content"]["itemContent"]["tweet_results"]["result"]["legacy"]["user_id_str"] =
			json!("");

		let tweets =
			payload_with_instructions(json!([{ "type": "TimelineAddEntry", "entry": entry }]))
				.into_tweets()
				.expect("Payload should normalize.");

		assert_eq!(tweets[0].author_id, "1209344563589992448");
	}

	#[test]
	fn profile_id_falls_back_to_the_legacy_id() {
		let mut entry = tweet_entry("1", "text");

		entry["content"]["itemContent"]["tweet_results"]["result"]["core"]["user_results"]
			["result"]["rest_id"] = json!(null);

		let tweets =
			payload_with_instructions(json!([{ "type": "TimelineAddEntry", "entry": entry }]))
				.into_tweets()
				.expect("Payload should normalize.");

		assert_eq!(tweets[0].author.id, "1209344563589992448");
	}

	#[test]
	fn anonymous_authors_drop_the_entry() {
		let mut entry = tweet_entry("1", "text");

		entry["content"]["itemContent"]["tweet_results"]["result"]["core"] = json!(null);

		let tweets =
			payload_with_instructions(json!([{ "type": "TimelineAddEntry", "entry": entry }]))
				.into_tweets()
				.expect("Payload should normalize.");

		assert!(tweets.is_empty());
	}
}
