//! Connector-level error types shared by the token protocol, the request signer, and the admin
//! API client.

// self
use crate::{_prelude::*, auth::KeyError, auth::Tier, codec::CodecError, web::SignRequestError};

/// Connector-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical connector error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Input could not be parsed or failed local validation.
	#[error(transparent)]
	MalformedInput(#[from] MalformedInputError),
	/// A signed response broke the token protocol.
	#[error(transparent)]
	ProtocolViolation(#[from] ProtocolViolationError),
	/// The verification clock is at or past the expiry embedded in a token.
	#[error(
		"The {tier} transaction expired at {expires_at}. Please check that the system time is correct."
	)]
	Expired {
		/// Tier whose token expired first.
		tier: Tier,
		/// Expiry carried by the token, in epoch seconds.
		expires_at: i64,
	},
	/// Transport failure (DNS, TCP, TLS, timeout, unreadable body).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The admin API answered with a non-`OK` envelope.
	#[error("Admin API returned an error (code {code:?}): {message}.")]
	RemoteApi {
		/// Numeric error code from the envelope, when present.
		code: Option<i64>,
		/// Human readable message from the envelope.
		message: String,
		/// Optional `message_detail` from the envelope.
		detail: Option<String>,
		/// HTTP status of the response.
		status: u16,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The admin API has no user with the requested username.
	#[error("User `{username}` is not registered in Duo.")]
	UserNotFound {
		/// Username that was looked up.
		username: String,
	},
	/// The caller did not supply a mobile number to compare against.
	#[error("User `{username}` does not have a mobile number in their profile.")]
	MobileClaimMissing {
		/// Username being verified.
		username: String,
	},
	/// The user exists but has no phone enrolled.
	#[error("User `{username}` does not have a phone registered in Duo.")]
	PhoneNotRegistered {
		/// Username being verified.
		username: String,
	},
	/// None of the enrolled phones match the supplied mobile number.
	#[error("Mobile number of user `{username}` does not match any phone registered in Duo.")]
	MobileNumberMismatch {
		/// Username being verified.
		username: String,
	},
}
impl From<CodecError> for Error {
	fn from(e: CodecError) -> Self {
		MalformedInputError::from(e).into()
	}
}
impl From<SignRequestError> for Error {
	fn from(e: SignRequestError) -> Self {
		MalformedInputError::from(e).into()
	}
}

/// Malformed input: bad key lengths, illegal usernames, undecodable Base64, non-UTF-8 payloads.
#[derive(Debug, ThisError)]
pub enum MalformedInputError {
	/// Base64 text could not be decoded.
	#[error(transparent)]
	Codec(#[from] CodecError),
	/// Token generation rejected one of its inputs.
	#[error(transparent)]
	SignRequest(#[from] SignRequestError),
	/// A key failed length validation.
	#[error(transparent)]
	Key(#[from] KeyError),
	/// A token payload decoded to bytes that are not UTF-8.
	#[error("The {tier} token payload is not valid UTF-8.")]
	PayloadEncoding {
		/// Tier carrying the payload.
		tier: Tier,
		/// Underlying decoding failure.
		#[source]
		source: std::string::FromUtf8Error,
	},
}

/// Structural failures of a signed response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProtocolViolationError {
	/// The response is not exactly two `:`-separated tokens.
	#[error("Response must contain exactly two tokens, found {found}.")]
	TokenCount {
		/// Number of tokens found.
		found: usize,
	},
	/// A token is not exactly three `|`-separated fields.
	#[error("The {tier} token must contain exactly three fields, found {found}.")]
	FieldCount {
		/// Tier being parsed.
		tier: Tier,
		/// Number of fields found.
		found: usize,
	},
	/// The supplied signature does not match the recomputed one.
	#[error("The {tier} token signature is invalid.")]
	SignatureMismatch {
		/// Tier being parsed.
		tier: Tier,
	},
	/// The token carries a tag other than the one expected for its tier.
	#[error("The {tier} token is tagged `{found}` instead of `{expected}`.")]
	TagMismatch {
		/// Tier being parsed.
		tier: Tier,
		/// Tag required at this point of the protocol.
		expected: &'static str,
		/// Tag actually carried by the token.
		found: String,
	},
	/// The decoded payload is not exactly three fields.
	#[error("The {tier} token payload must contain exactly three fields, found {found}.")]
	PayloadFieldCount {
		/// Tier being parsed.
		tier: Tier,
		/// Number of fields found.
		found: usize,
	},
	/// The payload was issued for another integration key.
	#[error("The {tier} token was issued for a different integration key.")]
	IntegrationKeyMismatch {
		/// Tier being parsed.
		tier: Tier,
	},
	/// The payload expiry is not an integer.
	#[error("The {tier} token expiry `{value}` is not an integer.")]
	InvalidExpiry {
		/// Tier being parsed.
		tier: Tier,
		/// Raw expiry field.
		value: String,
	},
	/// The service and application tokens name different users.
	#[error("Service and application tokens identify different users.")]
	UsernameMismatch,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Connector configuration could not be deserialized.
	#[error("Connector configuration is invalid.")]
	Parse {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The admin API host does not form a valid URL.
	#[error("Admin API host `{host}` is invalid.")]
	InvalidHost {
		/// Host that failed to parse.
		host: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Only one half of the admin credential pair was configured.
	#[error("Admin integration key and admin secret key must be configured together.")]
	IncompleteAdminCredentials,
	/// An operation needs admin credentials that are not configured.
	#[error("Admin API credentials are not configured.")]
	MissingAdminCredentials,
	/// Unknown request signature version.
	#[error("Signature version {version} is not supported.")]
	UnsupportedSignatureVersion {
		/// Version that was requested.
		version: u8,
	},
	/// Unknown HTTP method for an admin API request.
	#[error("HTTP method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Method that was requested.
		method: String,
	},
	/// The clock reading cannot be rendered as an RFC 2822 date.
	#[error("Request timestamp cannot be formatted.")]
	TimestampFormat(#[from] time::error::Format),
	/// HMAC could not be initialized.
	#[error(transparent)]
	Mac(#[from] crate::mac::MacError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, unreadable responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the admin API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Request timed out while calling the admin API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the admin API.")]
	Io(#[from] std::io::Error),
	/// The admin API responded with a body that is not a valid envelope.
	#[error("Admin API returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
