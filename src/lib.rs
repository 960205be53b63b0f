//! Duo two-factor connector core: stateless signed round-trip tokens, canonical admin API request
//! signing, and the Duo Base64 codec family, with an optional reqwest-backed admin client.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod admin;
pub mod auth;
pub mod clock;
pub mod codec;
pub mod config;
pub mod connector;
pub mod error;
pub mod http;
pub mod mac;
pub mod obs;
pub mod request;
pub mod web;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports, fixtures, and verifier helpers for tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	#[cfg(feature = "reqwest")]
	use crate::{admin::AdminClient, clock::FixedClock, http::ReqwestAdminTransport};
	use crate::{
		auth::{ApplicationKey, IntegrationKey, SecretKey, Tier},
		config::ConnectorConfig,
		mac,
	};

	/// Integration key fixture.
	pub const TEST_IKEY: &str = "01234567890123456789";
	/// Secret key fixture.
	pub const TEST_SKEY: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
	/// Application key fixture.
	pub const TEST_AKEY: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
	/// Admin integration key fixture.
	pub const TEST_ADMIN_IKEY: &str = "DIADMIN0000000000000";
	/// Admin secret key fixture.
	pub const TEST_ADMIN_SKEY: &str = "cccccccccccccccccccccccccccccccccccccccc";

	/// Plays the verifier: keeps the service payload of `signed_request`, re-tags it `AUTH`,
	/// re-signs it with `skey`, and passes the application token through untouched.
	pub fn verifier_response(signed_request: &str, skey: &str) -> String {
		let (service, application) =
			signed_request.split_once(':').expect("Signed request should carry two tokens.");
		let encoded = service.split('|').nth(1).expect("Service token should carry a payload.");
		let cookie = format!("{}|{encoded}", Tier::Service.verify_tag());
		let signature = mac::hmac_sign_hex(skey.as_bytes(), cookie.as_bytes())
			.expect("HMAC should accept the secret key.");

		format!("{cookie}|{signature}:{application}")
	}

	/// Connector configuration built from the key fixtures, without admin credentials.
	pub fn test_config() -> ConnectorConfig {
		ConnectorConfig::new(
			"api-test.example.com",
			IntegrationKey::new(TEST_IKEY).expect("Integration key fixture should be valid."),
			SecretKey::new(TEST_SKEY).expect("Secret key fixture should be valid."),
			ApplicationKey::new(TEST_AKEY).expect("Application key fixture should be valid."),
		)
	}

	/// Admin credential fixtures.
	pub fn test_admin_keys() -> (IntegrationKey, SecretKey) {
		(
			IntegrationKey::new(TEST_ADMIN_IKEY).expect("Admin ikey fixture should be valid."),
			SecretKey::new(TEST_ADMIN_SKEY).expect("Admin skey fixture should be valid."),
		)
	}

	/// Admin client pointed at a plain-HTTP mock server (`host:port`) with a frozen clock.
	#[cfg(feature = "reqwest")]
	pub fn test_admin_client(host: &str, now: i64) -> AdminClient<ReqwestAdminTransport> {
		let (ikey, skey) = test_admin_keys();
		let transport = ReqwestAdminTransport::with_client(ReqwestClient::new());

		AdminClient::new(transport, host, &ikey, &skey)
			.expect("Admin client fixture should build.")
			.with_scheme("http")
			.with_clock(Arc::new(FixedClock::at_unix(now)))
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {base64 as _, color_eyre as _, httpmock as _};
