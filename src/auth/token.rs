//! Signed tokens of the form `TAG|base64(username|ikey|expiry)|hex(hmac)`.
//!
//! The signature covers `TAG|base64(..)`, so a token cannot be re-tagged without the key.

// self
use crate::{
	_prelude::*,
	codec,
	error::{ConfigError, MalformedInputError, ProtocolViolationError},
	mac::{self, MacError},
	obs::{self, OpKind, OpSpan},
};

/// Lifetime of a service-tier token, in seconds.
pub const SERVICE_TTL: i64 = 300;
/// Lifetime of an application-tier token, in seconds.
pub const APPLICATION_TTL: i64 = 3600;

/// The two tiers of a signed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
	/// Tier shared with the verifier and signed with the secret key.
	Service,
	/// Tier private to the connector and signed with the application key.
	Application,
}
impl Tier {
	/// Tag used when the connector issues a token for this tier.
	pub const fn issue_tag(self) -> &'static str {
		match self {
			Tier::Service => "TX",
			Tier::Application => "APP",
		}
	}

	/// Tag expected when the connector verifies a token of this tier.
	///
	/// The verifier re-signs the service tier as `AUTH`; the application tier comes back as issued.
	pub const fn verify_tag(self) -> &'static str {
		match self {
			Tier::Service => "AUTH",
			Tier::Application => "APP",
		}
	}

	/// Token lifetime in seconds.
	pub const fn ttl(self) -> i64 {
		match self {
			Tier::Service => SERVICE_TTL,
			Tier::Application => APPLICATION_TTL,
		}
	}

	/// Returns a stable label for messages and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Tier::Service => "service",
			Tier::Application => "application",
		}
	}
}
impl Display for Tier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decoded token payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPayload {
	/// Username the token was issued for.
	pub username: String,
	/// Integration key the token was issued under.
	pub integration_key: String,
	/// Expiry in epoch seconds.
	pub expires_at: i64,
}
impl TokenPayload {
	/// Creates a payload.
	pub fn new(
		username: impl Into<String>,
		integration_key: impl Into<String>,
		expires_at: i64,
	) -> Self {
		Self { username: username.into(), integration_key: integration_key.into(), expires_at }
	}

	fn render(&self) -> String {
		format!("{}|{}|{}", self.username, self.integration_key, self.expires_at)
	}
}

/// Seals `payload` under `tag`, signing with `key`.
pub fn seal(key: &str, tag: &str, payload: &TokenPayload) -> Result<String, MacError> {
	let cookie = format!("{tag}|{}", codec::encode_standard(payload.render().as_bytes()));
	let signature = mac::hmac_sign_hex(key.as_bytes(), cookie.as_bytes())?;

	Ok(format!("{cookie}|{signature}"))
}

/// Opens a token of `tier` signed with `key`.
///
/// Checks run in order: field count, signature, tag, payload shape, integration key, expiry.
/// A token is live while `now` is strictly before its expiry.
pub fn open(
	key: &str,
	token: &str,
	tier: Tier,
	integration_key: &str,
	now: i64,
) -> Result<TokenPayload> {
	let _guard = OpSpan::new(OpKind::VerifyResponse, "open_token").with_tier(tier).entered();
	let opened = open_checked(key, token, tier, integration_key, now);

	if let Err(e) = &opened {
		obs::record_token_rejection(tier);
		obs::trace_token_rejection(tier, e);
	}

	opened
}

fn open_checked(
	key: &str,
	token: &str,
	tier: Tier,
	integration_key: &str,
	now: i64,
) -> Result<TokenPayload> {
	let fields = token.split('|').collect::<Vec<_>>();
	let &[tag, encoded, signature] = fields.as_slice() else {
		return Err(ProtocolViolationError::FieldCount { tier, found: fields.len() }.into());
	};
	let expected = mac::hmac_sign_hex(key.as_bytes(), format!("{tag}|{encoded}").as_bytes())
		.map_err(ConfigError::from)?;

	if !mac::constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
		return Err(ProtocolViolationError::SignatureMismatch { tier }.into());
	}
	if tag != tier.verify_tag() {
		return Err(ProtocolViolationError::TagMismatch {
			tier,
			expected: tier.verify_tag(),
			found: tag.to_owned(),
		}
		.into());
	}

	let cookie = String::from_utf8(codec::decode_standard(encoded)?)
		.map_err(|source| MalformedInputError::PayloadEncoding { tier, source })?;
	let parts = cookie.split('|').collect::<Vec<_>>();
	let &[username, issued_for, expiry] = parts.as_slice() else {
		return Err(ProtocolViolationError::PayloadFieldCount { tier, found: parts.len() }.into());
	};

	if issued_for != integration_key {
		return Err(ProtocolViolationError::IntegrationKeyMismatch { tier }.into());
	}

	let expires_at = expiry.parse::<i64>().map_err(|_| ProtocolViolationError::InvalidExpiry {
		tier,
		value: expiry.to_owned(),
	})?;

	if now >= expires_at {
		return Err(Error::Expired { tier, expires_at });
	}

	Ok(TokenPayload::new(username, issued_for, expires_at))
}
