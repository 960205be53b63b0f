//! Configured connector tying the token protocol to the admin API.

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestAdminTransport;
use crate::{
	_prelude::*,
	admin::AdminClient,
	clock::{Clock, SystemClock},
	config::ConnectorConfig,
	error::ConfigError,
	http::AdminTransport,
	web,
};

/// Issues and verifies signed requests for one Duo application, and optionally checks mobile
/// numbers through the admin API.
pub struct Connector<T>
where
	T: ?Sized + AdminTransport,
{
	config: ConnectorConfig,
	clock: Arc<dyn Clock>,
	admin: Option<AdminClient<T>>,
}
impl<T> Connector<T>
where
	T: ?Sized + AdminTransport,
{
	/// Creates a connector whose admin client (if configured) uses `transport`.
	pub fn with_transport(config: ConnectorConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		config.validate()?;

		let admin = match config.admin_credentials() {
			Some((ikey, skey)) => Some(AdminClient::new(transport, config.host.clone(), ikey, skey)?),
			None => None,
		};

		Ok(Self { config, clock: Arc::new(SystemClock), admin })
	}

	/// Replaces the admin client, e.g. to point it at a test server.
	pub fn with_admin_client(mut self, admin: AdminClient<T>) -> Self {
		self.admin = Some(admin.with_clock(self.clock.clone()));

		self
	}

	/// Overrides the clock for token expiry and admin request timestamps.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.admin = self.admin.map(|admin| admin.with_clock(clock.clone()));
		self.clock = clock;

		self
	}

	/// Active configuration.
	pub fn config(&self) -> &ConnectorConfig {
		&self.config
	}

	/// Admin client, when admin credentials are configured.
	pub fn admin(&self) -> Option<&AdminClient<T>> {
		self.admin.as_ref()
	}

	/// Issues a signed request for `username`.
	pub fn sign_request(&self, username: &str) -> Result<String> {
		Ok(web::sign_request_typed(
			&self.config.integration_key,
			&self.config.secret_key,
			&self.config.application_key,
			username,
			self.clock.unix_timestamp(),
		)?)
	}

	/// Verifies the verifier's response and returns the authenticated username.
	pub fn verify_response(&self, response: &str) -> Result<String> {
		web::verify_response(
			self.config.integration_key.expose(),
			self.config.secret_key.expose(),
			self.config.application_key.expose(),
			response,
			self.clock.unix_timestamp(),
		)
	}

	/// Verifies the response, then, when mobile verification is enabled, checks `mobile` against
	/// the user's Duo phones.
	pub async fn verify_response_with_mobile(&self, response: &str, mobile: &str) -> Result<String> {
		let username = self.verify_response(response)?;

		if !self.config.enable_mobile_verification {
			return Ok(username);
		}

		let admin = self.admin.as_ref().ok_or(ConfigError::MissingAdminCredentials)?;

		admin.verify_mobile_number(&username, mobile).await?;

		Ok(username)
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestAdminTransport> {
	/// Creates a connector backed by reqwest, honoring the configured timeout and proxy.
	pub fn new(config: ConnectorConfig) -> Result<Self> {
		let transport = ReqwestAdminTransport::new(config.timeout(), config.proxy.as_ref())?;

		Self::with_transport(config, transport)
	}
}
impl<T> Debug for Connector<T>
where
	T: ?Sized + AdminTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("config", &self.config)
			.field("admin", &self.admin)
			.finish_non_exhaustive()
	}
}
