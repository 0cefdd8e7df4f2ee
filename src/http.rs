//! Transport primitives for frontend API calls.
//!
//! The module exposes [`ApiTransport`] alongside the [`ApiRequest`] and
//! [`ApiResponse`] value types so downstream crates can integrate custom HTTP
//! stacks. The trait is object safe; sessions and scrapers share transports behind
//! `Arc<dyn ApiTransport>` handles, and tests substitute in-process fakes without
//! opening sockets.

// crates.io
use reqwest::{Method, cookie::Jar, header::HeaderMap};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, HttpError, TransportError},
};

/// Name of the remaining-request-count header consumed by the pipeline.
pub const RATE_LIMIT_REMAINING: &str = "x-rate-limit-remaining";

/// Future type returned by [`ApiTransport`] implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing frontend API calls.
///
/// Implementations must materialize the complete response body before resolving so
/// the pipeline can classify failures and hand callers the raw bytes. Transport
/// failures (DNS, TCP, TLS) surface as [`TransportError`] and are never retried by
/// the pipeline.
pub trait ApiTransport
where
	Self: Send + Sync,
{
	/// Executes the request and materializes the complete response.
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// HTTP method, URL, and headers describing one frontend API call.
///
/// Requests carry no body; every supported endpoint is parameterized through the
/// URL, and the activation endpoint takes an empty POST.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully parameterized request URL.
	pub url: Url,
	/// Header name/value pairs attached by the session and by callers.
	pub headers: Vec<(String, String)>,
}
impl ApiRequest {
	/// Creates a request with the provided method.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new() }
	}

	/// Creates a GET request for the provided URL.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Creates a POST request for the provided URL.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Appends a header pair.
	pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.headers.push((name.into(), value.into()));
	}

	/// Returns the first header with the provided name, compared case-insensitively.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(header, _)| header.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Materialized response: status line, headers, and the full body.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Numeric HTTP status code.
	pub status: u16,
	/// Canonical status line, e.g. `401 Unauthorized`.
	pub status_line: String,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns true for a 200 response.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}

	/// Returns the named header as a string when present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// True when the response reports no remaining rate-limit budget.
	pub fn rate_limit_exhausted(&self) -> bool {
		self.header(RATE_LIMIT_REMAINING) == Some("0")
	}

	/// Converts the response into [`HttpError`], preserving status and body.
	pub fn into_http_error(self) -> HttpError {
		HttpError { status: self.status, status_line: self.status_line, body: self.body }
	}
}

/// Reqwest-backed transport owning the session cookie jar.
///
/// The jar is registered as the client's cookie provider, so `Set-Cookie` responses
/// and cookies imported through the session are both visible to subsequent requests
/// and to the session's CSRF lookup.
#[derive(Clone)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	jar: Arc<Jar>,
}
impl ReqwestTransport {
	/// Builds a transport with a fresh cookie jar and the default TLS stack.
	pub fn new() -> Result<Self, ConfigError> {
		let jar = Arc::new(Jar::default());
		let client = ReqwestClient::builder().cookie_provider(jar.clone()).build()?;

		Ok(Self { client, jar })
	}

	/// Wraps an existing [`ReqwestClient`] sharing the provided cookie jar.
	///
	/// The jar must be the one registered on the client, otherwise the session reads
	/// different cookies than the transport sends.
	pub fn with_client(client: ReqwestClient, jar: Arc<Jar>) -> Self {
		Self { client, jar }
	}

	/// Returns the cookie jar shared with the session.
	pub fn cookie_jar(&self) -> Arc<Jar> {
		self.jar.clone()
	}
}
impl ApiTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut builder = self.client.request(request.method.clone(), request.url.clone());

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse {
				status: status.as_u16(),
				status_line: status.to_string(),
				headers,
				body,
			})
		})
	}
}
