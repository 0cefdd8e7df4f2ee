//! High-level scraping client.
//!
//! [`Scraper`] ties the three shared pieces together: a transport to send
//! requests through, a [`Session`] holding credentials, and a [`RequestThrottle`]
//! spacing requests out. Cloning a scraper clones the handles, so clones share
//! credentials, cookies, and the request window.

mod pipeline;
mod tweets;
pub use tweets::TWEET_DETAIL_OP;

// std
use std::time::Duration;
// self
use crate::{
	_prelude::*,
	http::{ApiTransport, ReqwestTransport},
	session::Session,
	throttle::RequestThrottle,
};

/// Scraping client for the X frontend API.
#[derive(Clone)]
pub struct Scraper {
	/// Transport requests are sent through.
	pub transport: Arc<dyn ApiTransport>,
	/// Credential session shared by every request.
	pub session: Arc<Session>,
	/// Spacing policy applied between requests.
	pub throttle: Arc<RequestThrottle>,
}
impl Scraper {
	/// Creates a scraper with a fresh cookie jar and default credentials.
	pub fn new() -> Result<Self> {
		let transport = ReqwestTransport::new()?;
		let session = Session::new(transport.cookie_jar());

		Ok(Self::with_transport(Arc::new(transport), session))
	}

	/// Creates a scraper over an explicit transport and session.
	pub fn with_transport(transport: Arc<dyn ApiTransport>, session: Session) -> Self {
		Self {
			transport,
			session: Arc::new(session),
			throttle: Arc::new(RequestThrottle::new(Duration::ZERO)),
		}
	}

	/// Sets the minimum spacing between requests.
	pub fn with_request_delay(self, delay: Duration) -> Self {
		self.throttle.set_delay(delay);

		self
	}
}
impl Debug for Scraper {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Scraper")
			.field("session", &self.session)
			.field("throttle", &self.throttle)
			.finish()
	}
}
