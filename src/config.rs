//! Connector configuration loaded from JSON or built in code.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{ApplicationKey, IntegrationKey, SecretKey},
	error::ConfigError,
};

/// Default connect + request timeout for admin API calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP proxy used for admin API calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
	/// Proxy host name.
	pub host: String,
	/// Proxy port.
	pub port: u16,
}
impl ProxyConfig {
	/// Renders the proxy as an `http://host:port` URL.
	pub fn url(&self) -> String {
		format!("http://{}:{}", self.host, self.port)
	}
}

/// Everything a connector instance needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectorConfig {
	/// Duo API host, e.g. `api-xxxxxxxx.duosecurity.com`.
	pub host: String,
	/// Integration key of the web SDK application.
	pub integration_key: IntegrationKey,
	/// Secret key of the web SDK application.
	pub secret_key: SecretKey,
	/// Connector-private application key.
	pub application_key: ApplicationKey,
	/// Integration key of the admin API application.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub admin_integration_key: Option<IntegrationKey>,
	/// Secret key of the admin API application.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub admin_secret_key: Option<SecretKey>,
	/// Connect and request timeout for admin API calls.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// Optional HTTP proxy for admin API calls.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub proxy: Option<ProxyConfig>,
	/// Compare the user's mobile number with their Duo phones after verification.
	#[serde(default)]
	pub enable_mobile_verification: bool,
}
impl ConnectorConfig {
	/// Creates a configuration without admin credentials.
	pub fn new(
		host: impl Into<String>,
		integration_key: IntegrationKey,
		secret_key: SecretKey,
		application_key: ApplicationKey,
	) -> Self {
		Self {
			host: host.into(),
			integration_key,
			secret_key,
			application_key,
			admin_integration_key: None,
			admin_secret_key: None,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			proxy: None,
			enable_mobile_verification: false,
		}
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Sets the admin API credential pair.
	pub fn with_admin_credentials(mut self, ikey: IntegrationKey, skey: SecretKey) -> Self {
		self.admin_integration_key = Some(ikey);
		self.admin_secret_key = Some(skey);

		self
	}

	/// Routes admin API calls through `proxy`.
	pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
		self.proxy = Some(proxy);

		self
	}

	/// Overrides the admin API timeout (whole seconds).
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout_secs = timeout.as_secs();

		self
	}

	/// Toggles mobile number verification.
	pub fn with_mobile_verification(mut self, enabled: bool) -> Self {
		self.enable_mobile_verification = enabled;

		self
	}

	/// Checks cross-field rules.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.admin_integration_key.is_some() != self.admin_secret_key.is_some() {
			return Err(ConfigError::IncompleteAdminCredentials);
		}

		Ok(())
	}

	/// Admin API timeout.
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.timeout_secs)
	}

	/// Admin credential pair, when configured.
	pub fn admin_credentials(&self) -> Option<(&IntegrationKey, &SecretKey)> {
		self.admin_integration_key.as_ref().zip(self.admin_secret_key.as_ref())
	}
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}
