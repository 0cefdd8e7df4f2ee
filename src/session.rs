//! Shared credential session: bearer rotation, guest activation, request preparation.
//!
//! One [`Session`] backs every request a scraper makes. All credential mutation goes
//! through its methods; the state sits behind an internal lock so a single session
//! can serve concurrent tasks, and guest activation is serialized behind a
//! singleflight guard so concurrent expired-token callers trigger one activation.

// crates.io
use reqwest::cookie::{CookieStore, Jar};
// self
use crate::{
	_prelude::*,
	auth::{BEARER_WEB, BearerPool, BearerToken, GuestToken, OpenAccountKeys},
	error::GuestTokenError,
	http::{ApiRequest, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Browser user agent presented on every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.5005.63 Safari/537.36";

/// Endpoint configuration, overridable for tests and mirrors.
#[derive(Clone, Debug)]
pub struct ApiEndpoints {
	/// Guest activation endpoint.
	pub guest_activation: Url,
	/// GraphQL root frontend queries are joined onto; must end with a slash.
	pub graphql_root: Url,
}
impl ApiEndpoints {
	/// Creates an endpoint set from explicit URLs.
	pub fn new(guest_activation: Url, graphql_root: Url) -> Self {
		Self { guest_activation, graphql_root }
	}
}
impl Default for ApiEndpoints {
	fn default() -> Self {
		Self {
			guest_activation: Url::parse("https://api.x.com/1.1/guest/activate.json")
				.expect("Static activation endpoint should parse."),
			graphql_root: Url::parse("https://x.com/i/api/graphql/")
				.expect("Static GraphQL root should parse."),
		}
	}
}

#[derive(Debug)]
struct CredentialState {
	bearer: BearerToken,
	guest: Option<GuestToken>,
	open_account: Option<OpenAccountKeys>,
	logged_in: bool,
}

#[derive(Debug, Deserialize)]
struct GuestActivation {
	guest_token: Option<String>,
}

/// Shared credential store backing every request a scraper makes.
pub struct Session {
	state: RwLock<CredentialState>,
	pool: BearerPool,
	endpoints: ApiEndpoints,
	user_agent: String,
	cookies: Arc<Jar>,
	activation_guard: AsyncMutex<()>,
}
impl Session {
	/// Creates a session with the default bearer, pool, endpoints, and user agent.
	///
	/// The jar must be the one the transport sends cookies from, so CSRF lookups see
	/// the same state the server does.
	pub fn new(cookies: Arc<Jar>) -> Self {
		Self {
			state: RwLock::new(CredentialState {
				bearer: BearerToken::new(BEARER_WEB),
				guest: None,
				open_account: None,
				logged_in: false,
			}),
			pool: BearerPool::default(),
			endpoints: ApiEndpoints::default(),
			user_agent: DEFAULT_USER_AGENT.into(),
			cookies,
			activation_guard: AsyncMutex::new(()),
		}
	}

	/// Overrides the active bearer credential.
	pub fn with_bearer(mut self, bearer: BearerToken) -> Self {
		self.state.get_mut().bearer = bearer;

		self
	}

	/// Overrides the fallback candidate pool.
	pub fn with_bearer_pool(mut self, pool: BearerPool) -> Self {
		self.pool = pool;

		self
	}

	/// Overrides the endpoint configuration.
	pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Overrides the user agent.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Returns the endpoint configuration.
	pub fn endpoints(&self) -> &ApiEndpoints {
		&self.endpoints
	}

	/// Returns the user agent presented on every request.
	pub fn user_agent(&self) -> &str {
		&self.user_agent
	}

	/// Returns a copy of the active bearer credential.
	pub fn bearer(&self) -> BearerToken {
		self.state.read().bearer.clone()
	}

	/// Atomically replaces the active bearer credential.
	pub fn rotate_bearer(&self, bearer: BearerToken) {
		self.state.write().bearer = bearer;
	}

	/// Returns the first pool candidate distinct from the active bearer.
	pub fn fallback_candidate(&self) -> Option<BearerToken> {
		self.pool.fallback_for(&self.state.read().bearer)
	}

	/// Returns the current guest token, if any.
	pub fn guest_token(&self) -> Option<GuestToken> {
		self.state.read().guest.clone()
	}

	/// Installs a previously captured guest token.
	pub fn set_guest_token(&self, token: GuestToken) {
		self.state.write().guest = Some(token);
	}

	/// Drops the guest token so the next guest request activates a fresh one.
	pub fn clear_guest_token(&self) {
		self.state.write().guest = None;
	}

	/// True when a guest token is present and strictly younger than three hours.
	pub fn is_guest_token_valid(&self) -> bool {
		self.state.read().guest.as_ref().is_some_and(GuestToken::is_fresh)
	}

	/// True when the session authenticates with account cookies instead of guest
	/// credentials.
	pub fn is_logged_in(&self) -> bool {
		self.state.read().logged_in
	}

	/// Imports session cookies, switching the session to cookie authentication.
	///
	/// Cookies are registered against the configured GraphQL root, the host every
	/// query is sent to.
	pub fn set_cookies<'a>(&self, cookies: impl IntoIterator<Item = (&'a str, &'a str)>) {
		for (name, value) in cookies {
			self.cookies
				.add_cookie_str(&format!("{name}={value}"), &self.endpoints.graphql_root);
		}

		self.state.write().logged_in = true;
	}

	/// Imports the `auth_token` + `ct0` cookie pair captured from a browser login.
	pub fn set_auth_token(&self, auth_token: &str, csrf_token: &str) {
		self.set_cookies([("auth_token", auth_token), ("ct0", csrf_token)]);
	}

	/// Installs OAuth 1.0a keys; subsequent requests are signed instead of carrying
	/// the bearer header.
	pub fn set_open_account_keys(&self, keys: OpenAccountKeys) {
		self.state.write().open_account = Some(keys);
	}

	/// Removes OAuth 1.0a keys, reverting to bearer authentication.
	pub fn clear_open_account_keys(&self) {
		self.state.write().open_account = None;
	}

	/// Prepares a request: user agent, guest credentials, authorization, CSRF.
	///
	/// Guest sessions refresh their token through `transport` when it is missing or
	/// stale; cookie-authenticated sessions skip guest handling entirely.
	pub async fn prepare(
		&self,
		request: &mut ApiRequest,
		transport: &dyn ApiTransport,
	) -> Result<()> {
		request.header("User-Agent", self.user_agent.clone());

		if !self.is_logged_in() {
			if !self.is_guest_token_valid() {
				self.refresh_guest_token(transport).await?;
			}
			if let Some(guest) = self.guest_token() {
				request.header("X-Guest-Token", guest.value());
			}
		}

		let authorization = {
			let state = self.state.read();

			match state.open_account.as_ref() {
				Some(keys) => keys.authorization_header(request.method.as_str(), &request.url),
				None => format!("Bearer {}", state.bearer.expose()),
			}
		};

		request.header("Authorization", authorization);

		if let Some(csrf) = self.csrf_token(&request.url) {
			request.header("X-CSRF-Token", csrf);
		}

		Ok(())
	}

	/// Activates a guest token, trying the active bearer first and then every pool
	/// candidate in order.
	///
	/// The candidate that wins the activation becomes the active bearer, so later
	/// requests present the pair the server accepted together. Per-candidate
	/// failures (transport, non-200, malformed body) continue the iteration; once
	/// every candidate failed, the most recent failure is surfaced.
	pub async fn refresh_guest_token(&self, transport: &dyn ApiTransport) -> Result<()> {
		const KIND: CallKind = CallKind::GuestActivation;

		let span = CallSpan::new(KIND, "refresh_guest_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.activation_guard.lock().await;

				if self.is_guest_token_valid() {
					return Ok(());
				}

				let candidates = self.pool.activation_order(&self.bearer());
				let mut attempts = 0_u32;
				let mut last = None;

				for candidate in candidates {
					attempts += 1;

					match self.activate(&candidate, transport).await {
						Ok(guest) => {
							let mut state = self.state.write();

							state.bearer = candidate;
							state.guest = Some(guest);

							return Ok(());
						},
						Err(err) => last = Some(err),
					}
				}

				match last {
					Some(last) =>
						Err(GuestTokenError::Exhausted { attempts, last: Box::new(last) }.into()),
					None => Err(GuestTokenError::NoCandidates.into()),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	async fn activate(
		&self,
		candidate: &BearerToken,
		transport: &dyn ApiTransport,
	) -> Result<GuestToken> {
		let mut request = ApiRequest::post(self.endpoints.guest_activation.clone());

		request.header("Authorization", format!("Bearer {}", candidate.expose()));
		request.header("User-Agent", self.user_agent.clone());

		let response = transport.send(&request).await?;

		if !response.is_ok() {
			return Err(response.into_http_error().into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let activation: GuestActivation = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { source })?;
		let value = activation
			.guest_token
			.filter(|token| !token.is_empty())
			.ok_or(GuestTokenError::Missing)?;

		Ok(GuestToken::issued_now(value))
	}

	fn csrf_token(&self, url: &Url) -> Option<String> {
		let header = self.cookies.cookies(url)?;
		let header = header.to_str().ok()?;

		header.split(';').find_map(|pair| {
			let (name, value) = pair.trim().split_once('=')?;

			(name == "ct0").then(|| value.to_string())
		})
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.read();

		f.debug_struct("Session")
			.field("logged_in", &state.logged_in)
			.field("guest_token_set", &state.guest.is_some())
			.field("open_account", &state.open_account.is_some())
			.finish()
	}
}
