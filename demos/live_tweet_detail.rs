//! Interactive `TweetDetail` walkthrough against the live frontend API.
//!
//! The example activates a guest session (or imports browser session cookies when
//! provided), fetches the requested tweet, and prints the surrounding
//! conversation.

// std
use std::{
	io::{self, Write},
	time::Duration,
};
// crates.io
use color_eyre::Result;
// self
use x_scraper::scraper::Scraper;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let tweet_id = prompt("Enter a tweet id", Some("20"))?;
	let auth_token = prompt_optional("Enter an auth_token cookie (leave blank for guest access)")?;
	let scraper = Scraper::new()?.with_request_delay(Duration::from_secs(1));

	if let Some(auth_token) = auth_token {
		let csrf_token = prompt("Enter the matching ct0 cookie", None)?;

		scraper.session.set_auth_token(&auth_token, &csrf_token);
	}

	match scraper.tweet_detail(&tweet_id).await? {
		Some(tweet) => {
			println!("@{} ({}): {}", tweet.author.handle, tweet.author.display_name, tweet.text);
			println!("Posted at: {}.", tweet.created_at);
		},
		None => println!("Tweet {tweet_id} was not present in the payload."),
	}

	let conversation = scraper.conversation(&tweet_id).await?;

	println!("Conversation entries: {}.", conversation.len());

	for tweet in conversation {
		println!("- @{}: {}", tweet.author.handle, tweet.text);
	}

	Ok(())
}

fn prompt(message: &str, default: Option<&str>) -> Result<String> {
	loop {
		match default {
			Some(value) => print!("{message} [{value}]: "),
			None => print!("{message}: "),
		}

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if !trimmed.is_empty() {
			return Ok(trimmed.to_owned());
		}
		if let Some(value) = default {
			return Ok(value.to_owned());
		}
	}
}

fn prompt_optional(message: &str) -> Result<Option<String>> {
	print!("{message}: ");

	io::stdout().flush()?;

	let mut input = String::new();

	io::stdin().read_line(&mut input)?;

	let trimmed = input.trim();

	if trimmed.is_empty() { Ok(None) } else { Ok(Some(trimmed.to_owned())) }
}
