//! Request execution pipeline.
//!
//! Every call funnels through [`Scraper::execute`]: wait out the request window,
//! prepare credentials, send, then classify the response. An HTTP 401 rotates the
//! bearer to the next pool candidate and retries, bounded by [`MAX_ATTEMPTS`];
//! exhausting the X rate limit drops the guest token so the next request
//! activates a fresh one.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	scraper::Scraper,
};

const MAX_ATTEMPTS: u32 = 2;

impl Scraper {
	/// Executes a request through the full pipeline and returns the successful
	/// response.
	///
	/// Non-success statuses other than a recoverable 401 surface as
	/// [`HttpError`](crate::error::HttpError) carrying the status line and body.
	pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Api;

		let span = CallSpan::new(KIND, "execute");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.execute_inner(request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Executes a request and decodes the successful response body as JSON.
	pub async fn execute_json<T>(&self, request: &ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.execute(request).await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source })
	}

	async fn execute_inner(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let mut attempts = 0_u32;

		loop {
			attempts += 1;

			let response = self.attempt(request).await?;

			if response.is_ok() {
				if response.rate_limit_exhausted() {
					self.session.clear_guest_token();
				}

				return Ok(response);
			}

			if response.status == 401
				&& attempts < MAX_ATTEMPTS
				&& let Some(fallback) = self.session.fallback_candidate()
			{
				self.session.rotate_bearer(fallback);

				continue;
			}

			return Err(response.into_http_error().into());
		}
	}

	// The window is rescheduled whether the attempt succeeded or not.
	async fn attempt(&self, request: &ApiRequest) -> Result<ApiResponse> {
		self.throttle.acquire().await;

		let result = async {
			let mut request = request.clone();

			self.session.prepare(&mut request, self.transport.as_ref()).await?;

			Ok(self.transport.send(&request).await?)
		}
		.await;

		self.throttle.schedule();

		result
	}
}
