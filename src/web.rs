//! Two-tier signed round trip with the Duo verifier.
//!
//! [`sign_request`] issues `TX|..:APP|..`. The verifier authenticates the user, re-signs the
//! service payload as `AUTH|..` with the shared secret key, and hands back `AUTH|..:APP|..`, which
//! [`verify_response`] accepts once both tiers check out and name the same user.

// self
use crate::{
	_prelude::*,
	auth::{
		ApplicationKey, IntegrationKey, SecretKey,
		token::{self, Tier, TokenPayload},
	},
	clock::Clock,
	error::ProtocolViolationError,
	mac::MacError,
	obs::{self, OpKind},
};

/// Reasons token generation refuses its inputs.
///
/// [`SignRequestError::sentinel`] renders the `ERR|..` strings older integrations compare against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum SignRequestError {
	/// The username is empty or contains `|`.
	#[error("The username passed to sign_request() is invalid.")]
	InvalidUsername,
	/// The integration key is not exactly 20 characters.
	#[error("The Duo integration key passed to sign_request() is invalid.")]
	InvalidIntegrationKey,
	/// The secret key is not exactly 40 characters.
	#[error("The Duo secret key passed to sign_request() is invalid.")]
	InvalidSecretKey,
	/// The application key is shorter than 40 characters.
	#[error("The application secret key passed to sign_request() must be at least 40 characters.")]
	InvalidApplicationKey,
	/// Signing failed for a reason unrelated to the inputs.
	#[error("An unknown error has occurred.")]
	Unknown,
}
impl SignRequestError {
	/// Returns the legacy `ERR|<message>` form of this error.
	pub fn sentinel(self) -> String {
		format!("ERR|{self}")
	}
}
impl From<MacError> for SignRequestError {
	fn from(_: MacError) -> Self {
		Self::Unknown
	}
}

/// Issues a signed request for `username`, valid from `now` (epoch seconds).
///
/// Inputs are validated in order: username, integration key, secret key, application key.
pub fn sign_request(
	ikey: &str,
	skey: &str,
	akey: &str,
	username: &str,
	now: i64,
) -> Result<String, SignRequestError> {
	obs::observe(OpKind::SignRequest, "sign_request", || {
		validate_sign_inputs(ikey, skey, akey, username)?;

		let service = seal_tier(Tier::Service, skey, ikey, username, now)?;
		let application = seal_tier(Tier::Application, akey, ikey, username, now)?;

		Ok(format!("{service}:{application}"))
	})
}

/// [`sign_request`] reading the time from `clock`.
pub fn sign_request_with_clock(
	ikey: &str,
	skey: &str,
	akey: &str,
	username: &str,
	clock: &dyn Clock,
) -> Result<String, SignRequestError> {
	sign_request(ikey, skey, akey, username, clock.unix_timestamp())
}

/// [`sign_request`] returning the `ERR|..` sentinel in place of an error.
pub fn sign_request_legacy(ikey: &str, skey: &str, akey: &str, username: &str, now: i64) -> String {
	sign_request(ikey, skey, akey, username, now).unwrap_or_else(SignRequestError::sentinel)
}

/// Issues a signed request from typed keys, which already satisfy the length rules.
pub fn sign_request_typed(
	ikey: &IntegrationKey,
	skey: &SecretKey,
	akey: &ApplicationKey,
	username: &str,
	now: i64,
) -> Result<String, SignRequestError> {
	sign_request(ikey.expose(), skey.expose(), akey.expose(), username, now)
}

/// Verifies the verifier's response and returns the authenticated username.
///
/// Key lengths are not checked here; a wrong key simply fails signature verification.
pub fn verify_response(
	ikey: &str,
	skey: &str,
	akey: &str,
	response: &str,
	now: i64,
) -> Result<String> {
	obs::observe(OpKind::VerifyResponse, "verify_response", || {
		let tokens = response.split(':').collect::<Vec<_>>();
		let &[service, application] = tokens.as_slice() else {
			return Err(ProtocolViolationError::TokenCount { found: tokens.len() }.into());
		};
		let service = token::open(skey, service, Tier::Service, ikey, now)?;
		let application = token::open(akey, application, Tier::Application, ikey, now)?;

		if service.username != application.username {
			return Err(ProtocolViolationError::UsernameMismatch.into());
		}

		Ok(service.username)
	})
}

/// [`verify_response`] reading the time from `clock`.
pub fn verify_response_with_clock(
	ikey: &str,
	skey: &str,
	akey: &str,
	response: &str,
	clock: &dyn Clock,
) -> Result<String> {
	verify_response(ikey, skey, akey, response, clock.unix_timestamp())
}

fn validate_sign_inputs(
	ikey: &str,
	skey: &str,
	akey: &str,
	username: &str,
) -> Result<(), SignRequestError> {
	if username.is_empty() || username.contains('|') {
		return Err(SignRequestError::InvalidUsername);
	}
	if !IntegrationKey::RULE.accepts(ikey) {
		return Err(SignRequestError::InvalidIntegrationKey);
	}
	if !SecretKey::RULE.accepts(skey) {
		return Err(SignRequestError::InvalidSecretKey);
	}
	if !ApplicationKey::RULE.accepts(akey) {
		return Err(SignRequestError::InvalidApplicationKey);
	}

	Ok(())
}

fn seal_tier(
	tier: Tier,
	key: &str,
	ikey: &str,
	username: &str,
	now: i64,
) -> Result<String, SignRequestError> {
	let payload = TokenPayload::new(username, ikey, now.saturating_add(tier.ttl()));

	Ok(token::seal(key, tier.issue_tag(), &payload)?)
}
