//! Client-level error types shared across the session, pipeline, and normalizer.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// API responded with a non-success HTTP status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// API accepted the request but reported GraphQL-level errors.
	#[error(transparent)]
	GraphQl(#[from] GraphQlError),
	/// Guest token acquisition failed.
	#[error(transparent)]
	GuestToken(#[from] GuestTokenError),
	/// Response body could not be decoded into the expected shape.
	#[error("API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure locating the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request URL cannot be built from the configured endpoints.
	#[error("Request URL is invalid.")]
	InvalidRequestUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Non-success HTTP status returned by the API, preserving the raw body so callers
/// can implement conditional handling on top of the pipeline's own 401 fallback.
///
/// The display form is `response status <status line>: <body>`.
#[derive(Clone, Debug)]
pub struct HttpError {
	/// Numeric status code.
	pub status: u16,
	/// Full status line, e.g. `401 Unauthorized`.
	pub status_line: String,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl HttpError {
	/// Returns the response body as UTF-8, replacing invalid sequences.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}
}
impl Display for HttpError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "response status {}: {}", self.status_line, self.body_text())
	}
}
impl StdError for HttpError {}

/// GraphQL-level errors reported inside an HTTP 200 response.
///
/// The display form is `graphql error: <messages joined by ", ">`.
#[derive(Clone, Debug)]
pub struct GraphQlError {
	/// Messages from the response `errors` array, in order.
	pub messages: Vec<String>,
}
impl Display for GraphQlError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "graphql error: {}", self.messages.join(", "))
	}
}
impl StdError for GraphQlError {}

/// Guest token acquisition failures.
#[derive(Debug, ThisError)]
pub enum GuestTokenError {
	/// Every attempted bearer candidate failed; carries the most recent failure.
	#[error("unable to get guest token after {attempts} attempts: {last}")]
	Exhausted {
		/// Number of candidates attempted.
		attempts: u32,
		/// Most recent per-candidate failure.
		#[source]
		last: Box<Error>,
	},
	/// No usable bearer candidate was available to attempt.
	#[error("unable to get guest token")]
	NoCandidates,
	/// Activation response decoded but carried no usable `guest_token` field.
	#[error("guest_token not found")]
	Missing,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn http_error_display_includes_status_line_and_body() {
		let err = HttpError {
			status: 404,
			status_line: "404 Not Found".into(),
			body: b"no such page".to_vec(),
		};

		assert_eq!(err.to_string(), "response status 404 Not Found: no such page");
	}

	#[test]
	fn graphql_error_display_joins_messages() {
		let err = GraphQlError { messages: vec!["first".into(), "second".into()] };

		assert_eq!(err.to_string(), "graphql error: first, second");
	}

	#[test]
	fn exhausted_guest_error_exposes_last_failure_as_source() {
		let last = Error::from(HttpError {
			status: 403,
			status_line: "403 Forbidden".into(),
			body: b"denied".to_vec(),
		});
		let err = GuestTokenError::Exhausted { attempts: 3, last: Box::new(last) };

		assert!(err.to_string().contains("unable to get guest token after 3 attempts"));
		assert!(err.to_string().contains("response status 403 Forbidden: denied"));
		assert!(StdError::source(&err).is_some());
	}
}
