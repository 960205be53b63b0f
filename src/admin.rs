//! Admin API client issuing signed requests and unwrapping the JSON envelope.
//!
//! Every response arrives as `{"stat": "OK", "response": ..}` or
//! `{"stat": "FAIL", "code": .., "message": .., "message_detail": ..}`. [`AdminClient::call`]
//! returns the `response` member of the former and [`Error::RemoteApi`] for the latter.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{IntegrationKey, SecretKey},
	clock::{Clock, SystemClock},
	error::{ConfigError, TransportError},
	http::{AdminTransport, HttpMethod, PreparedRequest, TransportResponse},
	obs::{self, OpKind, OpOutcome, OpSpan},
	request::{RequestSigner, SignatureVersion, canonical_query_string},
};

/// User listing endpoint.
pub const USERS_PATH: &str = "/admin/v1/users";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One admin API call before signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute path, e.g. `/admin/v1/users`.
	pub path: String,
	/// Request parameters.
	pub params: BTreeMap<String, String>,
}
impl AdminRequest {
	/// Creates a request without parameters.
	pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), params: BTreeMap::new() }
	}

	/// Creates a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Get, path)
	}

	/// Creates a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Post, path)
	}

	/// Adds a parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}
}

/// A user record from the admin API; unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
	/// Duo username.
	pub username: String,
	/// Duo user identifier.
	#[serde(default)]
	pub user_id: Option<String>,
	/// Enrolled phones.
	#[serde(default)]
	pub phones: Vec<AdminPhone>,
}

/// A phone enrolled for an [`AdminUser`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPhone {
	/// Phone number as stored by Duo, e.g. `+15555550100`.
	#[serde(default)]
	pub number: String,
	/// Duo phone identifier.
	#[serde(default)]
	pub phone_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
	stat: String,
	#[serde(default)]
	response: Option<Value>,
	#[serde(default)]
	code: Option<i64>,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	message_detail: Option<String>,
}

/// Signed admin API client over any [`AdminTransport`].
pub struct AdminClient<T>
where
	T: ?Sized + AdminTransport,
{
	transport: Arc<T>,
	host: String,
	scheme: String,
	signer: RequestSigner,
	clock: Arc<dyn Clock>,
}
impl<T> AdminClient<T>
where
	T: ?Sized + AdminTransport,
{
	/// Creates a client for `host` (e.g. `api-xxxxxxxx.duosecurity.com`) over HTTPS.
	pub fn new(
		transport: impl Into<Arc<T>>,
		host: impl Into<String>,
		ikey: &IntegrationKey,
		skey: &SecretKey,
	) -> Result<Self> {
		let host = host.into();

		Url::parse(&format!("https://{host}"))
			.map_err(|source| ConfigError::InvalidHost { host: host.clone(), source })?;

		Ok(Self {
			transport: transport.into(),
			host,
			scheme: "https".into(),
			signer: RequestSigner::new(ikey.expose(), skey.expose()),
			clock: Arc::new(SystemClock),
		})
	}

	/// Overrides the URL scheme; `http` is only meant for local test servers.
	pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = scheme.into();

		self
	}

	/// Overrides the signature version.
	pub fn with_signature_version(mut self, version: SignatureVersion) -> Self {
		self.signer = self.signer.with_version(version);

		self
	}

	/// Overrides the clock used for request timestamps.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// API host requests are signed for.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// Signs `request` and lays it out for the transport.
	pub fn prepare(&self, request: &AdminRequest) -> Result<PreparedRequest> {
		let signed = self.signer.sign(
			request.method.as_str(),
			&self.host,
			&request.path,
			&request.params,
			self.clock.now(),
		)?;
		let query = canonical_query_string(&request.params);
		let mut url = Url::parse(&format!("{}://{}{}", self.scheme, self.host, request.path))
			.map_err(|source| ConfigError::InvalidHost { host: self.host.clone(), source })?;
		let mut headers = signed.into_pairs();
		let body = if request.method.carries_body() {
			headers.push(("Content-Type".into(), FORM_CONTENT_TYPE.into()));

			Some(query)
		} else {
			if !query.is_empty() {
				url.set_query(Some(&query));
			}

			None
		};

		Ok(PreparedRequest { method: request.method, url, headers, body })
	}

	/// Sends `request` and returns the envelope's `response` member.
	pub async fn call(&self, request: &AdminRequest) -> Result<Value> {
		const KIND: OpKind = OpKind::AdminCall;

		let span = OpSpan::new(KIND, "call");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let prepared = self.prepare(request)?;
				let response = self.transport.execute(prepared).await?;

				parse_envelope(&response)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Looks up users by exact username; an empty result is [`Error::UserNotFound`].
	pub async fn users_by_username(&self, username: &str) -> Result<Vec<AdminUser>> {
		let value = self.call(&AdminRequest::get(USERS_PATH).param("username", username)).await?;
		let users: Vec<AdminUser> = serde_path_to_error::deserialize(value)
			.map_err(|source| TransportError::ResponseParse { source, status: None })?;

		if users.is_empty() {
			return Err(Error::UserNotFound { username: username.to_owned() });
		}

		Ok(users)
	}

	/// Checks that `mobile` equals one of the phone numbers Duo has for `username`.
	///
	/// Numbers are compared verbatim, so both sides must use the same format.
	pub async fn verify_mobile_number(&self, username: &str, mobile: &str) -> Result<AdminUser> {
		if mobile.is_empty() {
			return Err(Error::MobileClaimMissing { username: username.to_owned() });
		}

		let user = self
			.users_by_username(username)
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| Error::UserNotFound { username: username.to_owned() })?;

		if user.phones.is_empty() {
			return Err(Error::PhoneNotRegistered { username: username.to_owned() });
		}
		if !user.phones.iter().any(|phone| phone.number == mobile) {
			return Err(Error::MobileNumberMismatch { username: username.to_owned() });
		}

		Ok(user)
	}
}
impl<T> Debug for AdminClient<T>
where
	T: ?Sized + AdminTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AdminClient")
			.field("host", &self.host)
			.field("scheme", &self.scheme)
			.field("signer", &self.signer)
			.finish_non_exhaustive()
	}
}

fn parse_envelope(response: &TransportResponse) -> Result<Value> {
	let mut de = serde_json::Deserializer::from_slice(&response.body);
	let envelope: Envelope = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| TransportError::ResponseParse { source, status: Some(response.status) })?;

	if envelope.stat == "OK" {
		return Ok(envelope.response.unwrap_or(Value::Null));
	}

	Err(Error::RemoteApi {
		code: envelope.code,
		message: envelope.message.unwrap_or_else(|| format!("stat {}", envelope.stat)),
		detail: envelope.message_detail,
		status: response.status,
	})
}
