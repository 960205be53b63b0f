//! Symbol tables for the three Base64 dialects.
//!
//! Every dialect is a 64-symbol encode table; the matching decode table is derived from it at
//! compile time so the three variants cannot drift apart.

// self
use crate::_prelude::*;

pub(crate) const INVALID: u8 = 0xFF;
pub(crate) const WHITESPACE: u8 = 0xFE;
pub(crate) const PADDING: u8 = 0xFD;

const STANDARD_SYMBOLS: &[u8; 64] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_SAFE_SYMBOLS: &[u8; 64] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const ORDERED_SYMBOLS: &[u8; 64] =
	b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

static STANDARD_TABLE: [u8; 256] = decode_table(STANDARD_SYMBOLS);
static URL_SAFE_TABLE: [u8; 256] = decode_table(URL_SAFE_SYMBOLS);
static ORDERED_TABLE: [u8; 256] = decode_table(ORDERED_SYMBOLS);

/// Base64 dialect shared by producer and consumer. There is no negotiation: text encoded with one
/// dialect must be decoded with the same one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alphabet {
	/// RFC 4648 alphabet with `+` and `/`.
	#[default]
	Standard,
	/// RFC 4648 URL and filename safe alphabet with `-` and `_`.
	UrlSafe,
	/// Ordering-preserving alphabet: encoded text sorts like the encoded bytes.
	Ordered,
}
impl Alphabet {
	/// Returns the 64 encoding symbols in sextet order.
	pub const fn symbols(self) -> &'static [u8; 64] {
		match self {
			Alphabet::Standard => STANDARD_SYMBOLS,
			Alphabet::UrlSafe => URL_SAFE_SYMBOLS,
			Alphabet::Ordered => ORDERED_SYMBOLS,
		}
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Alphabet::Standard => "standard",
			Alphabet::UrlSafe => "url_safe",
			Alphabet::Ordered => "ordered",
		}
	}

	pub(crate) fn decode_table(self) -> &'static [u8; 256] {
		match self {
			Alphabet::Standard => &STANDARD_TABLE,
			Alphabet::UrlSafe => &URL_SAFE_TABLE,
			Alphabet::Ordered => &ORDERED_TABLE,
		}
	}
}
impl Display for Alphabet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

const fn decode_table(symbols: &[u8; 64]) -> [u8; 256] {
	let mut table = [INVALID; 256];

	table[b'\t' as usize] = WHITESPACE;
	table[b'\n' as usize] = WHITESPACE;
	table[b'\r' as usize] = WHITESPACE;
	table[b' ' as usize] = WHITESPACE;
	table[b'=' as usize] = PADDING;

	let mut i = 0;

	while i < symbols.len() {
		table[symbols[i] as usize] = i as u8;
		i += 1;
	}

	table
}
