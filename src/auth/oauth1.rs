//! OAuth 1.0a request signing for open accounts.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::_prelude::*;

type HmacSha1 = Hmac<Sha1>;

/// Consumer and access key pairs identifying an open (app-provisioned) account.
///
/// When a session carries these keys, every request is signed with HMAC-SHA1 per
/// RFC 5849 and the bearer `Authorization` header is not used.
#[derive(Clone)]
pub struct OpenAccountKeys {
	/// OAuth consumer key.
	pub consumer_key: String,
	/// OAuth consumer secret.
	pub consumer_secret: String,
	/// OAuth access token.
	pub access_token: String,
	/// OAuth access token secret.
	pub access_token_secret: String,
}
impl OpenAccountKeys {
	/// Bundles the four credential strings.
	pub fn new(
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<String>,
		access_token: impl Into<String>,
		access_token_secret: impl Into<String>,
	) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			access_token: access_token.into(),
			access_token_secret: access_token_secret.into(),
		}
	}

	/// Builds a signed `Authorization` header value for the request, generating a
	/// fresh nonce and timestamp.
	pub fn authorization_header(&self, method: &str, url: &Url) -> String {
		let nonce = nonce();
		let timestamp = OffsetDateTime::now_utc().unix_timestamp();

		self.authorization_header_at(method, url, &nonce, timestamp)
	}

	/// Deterministic signing variant taking an explicit nonce and Unix timestamp.
	///
	/// Request parameters are collected from the URL query string; the signature
	/// covers them alongside the OAuth protocol parameters.
	pub fn authorization_header_at(
		&self,
		method: &str,
		url: &Url,
		nonce: &str,
		timestamp: i64,
	) -> String {
		let signature = self.signature(method, url, nonce, timestamp);
		let mut fields = self.protocol_params(nonce, timestamp);

		fields.push(("oauth_signature".into(), signature));
		fields.sort();

		let fields = fields
			.iter()
			.map(|(name, value)| format!("{name}=\"{}\"", component(value)))
			.collect::<Vec<_>>()
			.join(", ");

		format!("OAuth {fields}")
	}

	fn signature(&self, method: &str, url: &Url, nonce: &str, timestamp: i64) -> String {
		let mut params: Vec<(String, String)> = url
			.query_pairs()
			.map(|(name, value)| (name.into_owned(), value.into_owned()))
			.collect();

		params.extend(self.protocol_params(nonce, timestamp));

		// Sorting happens on the encoded form, as the signature base string requires.
		let mut encoded: Vec<(String, String)> =
			params.iter().map(|(name, value)| (component(name), component(value))).collect();

		encoded.sort();

		let parameter_string = encoded
			.iter()
			.map(|(name, value)| format!("{name}={value}"))
			.collect::<Vec<_>>()
			.join("&");
		let mut base_url = url.clone();

		base_url.set_query(None);
		base_url.set_fragment(None);

		let base_string = format!(
			"{}&{}&{}",
			method.to_uppercase(),
			component(base_url.as_str()),
			component(&parameter_string),
		);
		let signing_key = format!(
			"{}&{}",
			component(&self.consumer_secret),
			component(&self.access_token_secret),
		);
		let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
			.expect("HMAC accepts keys of any length.");

		mac.update(base_string.as_bytes());

		STANDARD.encode(mac.finalize().into_bytes())
	}

	fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
		vec![
			("oauth_consumer_key".into(), self.consumer_key.clone()),
			("oauth_nonce".into(), nonce.into()),
			("oauth_signature_method".into(), "HMAC-SHA1".into()),
			("oauth_timestamp".into(), timestamp.to_string()),
			("oauth_token".into(), self.access_token.clone()),
			("oauth_version".into(), "1.0".into()),
		]
	}
}
impl Debug for OpenAccountKeys {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OpenAccountKeys")
			.field("consumer_key", &self.consumer_key)
			.field("consumer_secret", &"<redacted>")
			.field("access_token", &self.access_token)
			.field("access_token_secret", &"<redacted>")
			.finish()
	}
}

/// Percent-encodes a signature component with the RFC 3986 unreserved set.
fn component(value: &str) -> String {
	urlencoding::encode(value).into_owned()
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(32).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
	const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
	const ACCESS_TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
	const ACCESS_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
	const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
	const TIMESTAMP: i64 = 1318622958;

	#[test]
	fn signature_matches_the_published_worked_example() {
		let keys =
			OpenAccountKeys::new(CONSUMER_KEY, CONSUMER_SECRET, ACCESS_TOKEN, ACCESS_SECRET);
		let url = Url::parse(
			"https://api.twitter.com/1.1/statuses/update.json?include_entities=true&status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21",
		)
		.expect("Worked-example URL should parse.");
		let header = keys.authorization_header_at("POST", &url, NONCE, TIMESTAMP);

		assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
		assert!(header.contains("oauth_signature=\"tnnArxj06cWHq44gCs1OSKk%2FjLY%3D\""));
		assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
		assert!(header.contains("oauth_timestamp=\"1318622958\""));
		assert!(header.contains("oauth_version=\"1.0\""));
	}

	#[test]
	fn query_parameters_participate_in_the_signature() {
		let keys = OpenAccountKeys::new("ck", "cs", "at", "as");
		let with_query = Url::parse("https://x.com/i/api/graphql/op/TweetDetail?variables=%7B%7D")
			.expect("Query URL fixture should parse.");
		let without_query = Url::parse("https://x.com/i/api/graphql/op/TweetDetail")
			.expect("Bare URL fixture should parse.");

		assert_ne!(
			keys.authorization_header_at("GET", &with_query, "nonce", 1),
			keys.authorization_header_at("GET", &without_query, "nonce", 1),
		);
	}

	#[test]
	fn fresh_headers_use_distinct_nonces() {
		let keys = OpenAccountKeys::new("ck", "cs", "at", "as");
		let url = Url::parse("https://x.com/i/api/oauth/echo")
			.expect("URL fixture should parse.");

		assert_ne!(keys.authorization_header("GET", &url), keys.authorization_header("GET", &url));
	}

	#[test]
	fn debug_redacts_secret_material() {
		let keys = OpenAccountKeys::new("key", "secret-material", "token", "token-secret");
		let rendered = format!("{keys:?}");

		assert!(rendered.contains("key"));
		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("secret-material"));
	}
}
