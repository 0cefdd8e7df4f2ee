//! Demonstrates fetching a tweet through the scraping pipeline with the default
//! reqwest transport, backed by a local mock of the frontend API.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use x_scraper::{
	auth::{BearerPool, BearerToken},
	http::ReqwestTransport,
	scraper::Scraper,
	session::{ApiEndpoints, Session},
	url::Url,
};

const FOCAL_ID: &str = "2001787100006690996";
const DETAIL_BODY: &str = r#"{
	"data": {
		"threaded_conversation_with_injections_v2": {
			"instructions": [
				{
					"type": "TimelineAddEntries",
					"entries": [
						{
							"content": {
								"itemContent": {
									"tweet_results": {
										"result": {
											"rest_id": "2001787100006690996",
											"core": {
												"user_results": {
													"result": {
														"rest_id": "1209344563589992448",
														"legacy": {
															"id_str": "1209344563589992448",
															"name": "Rustacean",
															"screen_name": "rustacean"
														}
													}
												}
											},
											"legacy": {
												"conversation_id_str": "2001787100006690996",
												"created_at": "Thu Dec 18 09:30:00 +0000 2025",
												"full_text": "Threading the needle.",
												"id_str": "2001787100006690996",
												"user_id_str": "1209344563589992448"
											}
										}
									}
								}
							}
						}
					]
				}
			]
		}
	}
}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let activation_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/1.1/guest/activate.json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"guest_token\":\"demo-guest\"}");
		})
		.await;
	let detail_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/i/api/graphql/xOhkmRac04YFZmOzU9PJHg/TweetDetail");
			then.status(200).header("content-type", "application/json").body(DETAIL_BODY);
		})
		.await;
	let transport = ReqwestTransport::new()?;
	let session = Session::new(transport.cookie_jar())
		.with_endpoints(ApiEndpoints::new(
			Url::parse(&server.url("/1.1/guest/activate.json"))?,
			Url::parse(&server.url("/i/api/graphql/"))?,
		))
		.with_bearer(BearerToken::new("demo-bearer"))
		.with_bearer_pool(BearerPool::new([BearerToken::new("demo-fallback")]));
	let scraper = Scraper::with_transport(Arc::new(transport), session);

	match scraper.tweet_detail(FOCAL_ID).await? {
		Some(tweet) => {
			println!("@{} ({}): {}", tweet.author.handle, tweet.author.display_name, tweet.text);
			println!("Posted at: {}.", tweet.created_at);
		},
		None => println!("Tweet {FOCAL_ID} was not present in the payload."),
	}

	activation_mock.assert_async().await;
	detail_mock.assert_async().await;

	Ok(())
}
