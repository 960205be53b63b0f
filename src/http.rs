//! Transport primitives for admin API calls.
//!
//! The module exposes [`AdminTransport`] alongside [`PreparedRequest`] and [`TransportResponse`]
//! so downstream crates can plug in their own HTTP stack. The admin client signs and builds every
//! request before handing it over; a transport only moves bytes and never retries.

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration as StdDuration};
// self
#[cfg(feature = "reqwest")] use crate::config::ProxyConfig;
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`AdminTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// HTTP methods accepted by the admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`; parameters travel in the query string.
	Get,
	/// `POST`; parameters travel as a form body.
	Post,
	/// `PUT`; parameters travel as a form body.
	Put,
	/// `DELETE`; parameters travel in the query string.
	Delete,
}
impl HttpMethod {
	/// Upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Delete => "DELETE",
		}
	}

	/// Whether parameters are sent as a form body instead of the query string.
	pub const fn carries_body(self) -> bool {
		matches!(self, HttpMethod::Post | HttpMethod::Put)
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Self::Get),
			"POST" => Ok(Self::Post),
			"PUT" => Ok(Self::Put),
			"DELETE" => Ok(Self::Delete),
			_ => Err(ConfigError::UnsupportedMethod { method: s.to_owned() }),
		}
	}
}

/// A signed request ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute URL including the query string for `GET`/`DELETE`.
	pub url: Url,
	/// Headers to send verbatim.
	pub headers: Vec<(String, String)>,
	/// Form body for `POST`/`PUT`.
	pub body: Option<String>,
}
impl PreparedRequest {
	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}
}

/// Raw response returned by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP stacks able to execute admin API requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by several
/// clients, and their futures must be `Send` so callers can spawn them on any executor.
pub trait AdminTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the raw response, whatever its status.
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Admin API calls never follow redirects; configure any custom [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestAdminTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestAdminTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with `timeout` applied to both connecting and the whole request, routed
	/// through `proxy` when one is given.
	pub fn new(timeout: StdDuration, proxy: Option<&ProxyConfig>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder()
			.connect_timeout(timeout)
			.timeout(timeout)
			.redirect(reqwest::redirect::Policy::none());

		if let Some(proxy) = proxy {
			builder = builder.proxy(reqwest::Proxy::all(proxy.url())?);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestAdminTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestAdminTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AdminTransport for ReqwestAdminTransport {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Put => reqwest::Method::PUT,
				HttpMethod::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok::<_, TransportError>(TransportResponse { status, body })
		})
	}
}
