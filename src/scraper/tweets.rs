//! `TweetDetail` endpoint callers.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::ApiRequest,
	obs::{self, CallKind, CallOutcome, CallSpan},
	scraper::Scraper,
	timeline::{ConversationPayload, Tweet},
};

/// GraphQL query id and operation name for `TweetDetail`, joined onto the GraphQL
/// root.
pub const TWEET_DETAIL_OP: &str = "xOhkmRac04YFZmOzU9PJHg/TweetDetail";

impl Scraper {
	/// Fetches a single tweet by id.
	///
	/// Returns `Ok(None)` when the conversation payload decodes cleanly but
	/// carries no tweet with the requested id.
	pub async fn tweet_detail(&self, id: &str) -> Result<Option<Tweet>> {
		const KIND: CallKind = CallKind::TweetDetail;

		let span = CallSpan::new(KIND, "tweet_detail");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let tweets = self.fetch_conversation(id).await?;

				Ok(tweets.into_iter().find(|tweet| tweet.id == id))
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Fetches the conversation around a tweet, in timeline order.
	pub async fn conversation(&self, id: &str) -> Result<Vec<Tweet>> {
		const KIND: CallKind = CallKind::TweetDetail;

		let span = CallSpan::new(KIND, "conversation");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.fetch_conversation(id)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	async fn fetch_conversation(&self, id: &str) -> Result<Vec<Tweet>> {
		let url = tweet_detail_url(&self.session.endpoints().graphql_root, id)?;
		let request = ApiRequest::get(url);
		let payload = self.execute_json::<ConversationPayload>(&request).await?;

		Ok(payload.into_tweets()?)
	}
}

fn tweet_detail_url(root: &Url, id: &str) -> Result<Url> {
	let mut url =
		root.join(TWEET_DETAIL_OP).map_err(|source| ConfigError::InvalidRequestUrl { source })?;
	let variables = json!({
		"focalTweetId": id,
		"includePromotedContent": true,
		"withBirdwatchNotes": true,
		"withCommunity": true,
		"withQuickPromoteEligibilityTweetFields": true,
		"withV2Timeline": true,
		"withVoice": true,
		"with_rux_injections": false,
	})
	.to_string();
	let features = json!({
		"creator_subscriptions_tweet_preview_api_enabled": true,
		"freedom_of_speech_not_reach_fetch_enabled": true,
		"graphql_is_translatable_rweb_tweet_is_translatable_enabled": true,
		"longform_notetweets_consumption_enabled": true,
		"longform_notetweets_inline_media_enabled": true,
		"longform_notetweets_rich_text_read_enabled": true,
		"responsive_web_edit_tweet_api_enabled": true,
		"responsive_web_enhance_cards_enabled": false,
		"responsive_web_graphql_exclude_directive_enabled": true,
		"responsive_web_graphql_skip_user_profile_image_extensions_enabled": false,
		"responsive_web_graphql_timeline_navigation_enabled": true,
		"responsive_web_media_download_video_enabled": false,
		"responsive_web_twitter_article_tweet_consumption_enabled": false,
		"rweb_lists_timeline_redesign_enabled": true,
		"standardized_nudges_misinfo": true,
		"tweet_awards_web_tipping_enabled": false,
		"tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled": true,
		"tweetypie_unmention_optimization_enabled": true,
		"verified_phone_label_enabled": false,
		"view_counts_everywhere_api_enabled": true,
	})
	.to_string();

	url.query_pairs_mut().append_pair("variables", &variables).append_pair("features", &features);

	Ok(url)
}
