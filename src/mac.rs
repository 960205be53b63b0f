//! HMAC-SHA1 signing, lowercase hex rendering, and constant-time comparison.

// crates.io
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
// self
use crate::_prelude::*;

type HmacSha1 = Hmac<Sha1>;

/// Length in bytes of an HMAC-SHA1 tag.
pub const HMAC_SHA1_LEN: usize = 20;

/// HMAC initialization failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HMAC-SHA1 could not be initialized with the supplied key.")]
pub struct MacError;

/// Computes the raw HMAC-SHA1 tag of `message` under `key`.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> Result<[u8; HMAC_SHA1_LEN], MacError> {
	let mut mac = HmacSha1::new_from_slice(key).map_err(|_| MacError)?;

	mac.update(message);

	let mut tag = [0; HMAC_SHA1_LEN];

	tag.copy_from_slice(&mac.finalize().into_bytes());

	Ok(tag)
}

/// Computes the HMAC-SHA1 tag of `message` under `key` as lowercase hex.
pub fn hmac_sign_hex(key: &[u8], message: &[u8]) -> Result<String, MacError> {
	hmac_sha1(key, message).map(|tag| bytes_to_hex(&tag))
}

/// Renders bytes as lowercase hex, two digits per byte, no separators.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
	hex::encode(bytes)
}

/// Compares two byte strings in time independent of where they differ.
///
/// Only the lengths leak: inputs of different length compare unequal immediately. Hex signatures
/// have a fixed length, so the comparison reveals nothing about the expected signature.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	a.ct_eq(b).into()
}
