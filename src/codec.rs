//! Duo Base64 codec: three alphabets, optional line breaking, and transparent gzip framing.
//!
//! Bulk helpers ([`encode`], [`decode`]) and the streaming writers in [`stream`] share the same
//! group encoder and quantum decoder, so both produce identical bytes for the same input and
//! [`Options`].

pub mod alphabet;
pub mod stream;

pub use alphabet::*;
pub use stream::*;

// std
use std::{
	io::{Read, Write},
	ops::BitOr,
};
// crates.io
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
// self
use crate::_prelude::*;

/// Number of output symbols per line when [`Options::DO_BREAK_LINES`] is set.
pub const MAX_LINE_LENGTH: usize = 76;

const NEW_LINE: u8 = b'\n';
const EQUALS_SIGN: u8 = b'=';
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while encoding or decoding.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// A byte outside the alphabet, whitespace, and `=` was found.
	#[error("Bad Base64 input character decimal {byte} in position {position}.")]
	InvalidCharacter {
		/// Offending byte.
		byte: u8,
		/// Position of the byte within the input.
		position: usize,
	},
	/// Non-empty input shorter than one quantum.
	#[error("Base64 input must have at least four characters, but {len} were supplied.")]
	TooShort {
		/// Length of the supplied input.
		len: usize,
	},
	/// Misplaced `=` or a trailing incomplete quantum.
	#[error("Base64 input is not properly padded.")]
	InvalidPadding,
	/// Offset and length select bytes outside the source.
	#[error("Cannot process {len} bytes at offset {offset} of a source with length {source_len}.")]
	OutOfBounds {
		/// Requested offset.
		offset: usize,
		/// Requested length.
		len: usize,
		/// Length of the source.
		source_len: usize,
	},
	/// Gzip compression or decompression failed.
	#[error("Gzip framing failed.")]
	Gzip(#[source] std::io::Error),
	/// The sink of a streaming decoder failed.
	#[error("Writing decoded output failed.")]
	Sink(#[source] std::io::Error),
}
impl CodecError {
	/// Returns true for errors caused by the content of the input (as opposed to the arguments).
	pub fn is_malformed(&self) -> bool {
		!matches!(self, CodecError::OutOfBounds { .. } | CodecError::Sink(_))
	}
}

/// Option flags applied to a codec call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Options(u8);
impl Options {
	/// No options.
	pub const NONE: Self = Self(0);
	/// Gzip-compress the input before encoding.
	pub const GZIP: Self = Self(1 << 1);
	/// Do not inflate gzip-framed data while decoding.
	pub const DONT_GUNZIP: Self = Self(1 << 2);
	/// Insert a newline after every [`MAX_LINE_LENGTH`] output symbols.
	pub const DO_BREAK_LINES: Self = Self(1 << 3);

	/// Returns true when every flag in `other` is set.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	/// Combines two option sets.
	pub const fn union(self, other: Self) -> Self {
		Self(self.0 | other.0)
	}
}
impl BitOr for Options {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self::Output {
		self.union(rhs)
	}
}

/// Encodes `source` with the selected alphabet and options.
pub fn encode(source: &[u8], alphabet: Alphabet, options: Options) -> Result<String, CodecError> {
	let mut out = Vec::with_capacity(encoded_len(source.len(), options));

	if options.contains(Options::GZIP) {
		let mut gz = GzEncoder::new(Vec::new(), Compression::default());

		gz.write_all(source).map_err(CodecError::Gzip)?;

		let compressed = gz.finish().map_err(CodecError::Gzip)?;

		GroupEncoder::new(alphabet, options).encode_all(&compressed, &mut out);
	} else {
		GroupEncoder::new(alphabet, options).encode_all(source, &mut out);
	}

	Ok(ascii_to_string(out))
}

/// Encodes `len` bytes of `source` starting at `offset`.
pub fn encode_slice(
	source: &[u8],
	offset: usize,
	len: usize,
	alphabet: Alphabet,
	options: Options,
) -> Result<String, CodecError> {
	encode(window(source, offset, len)?, alphabet, options)
}

/// Encodes with the standard alphabet and no options; this form cannot fail.
pub fn encode_standard(source: &[u8]) -> String {
	let mut out = Vec::with_capacity(encoded_len(source.len(), Options::NONE));

	GroupEncoder::new(Alphabet::Standard, Options::NONE).encode_all(source, &mut out);

	ascii_to_string(out)
}

/// Decodes `source` with the selected alphabet and options.
///
/// Whitespace is skipped and `=` ends the data. Output that starts with the gzip magic number is
/// inflated unless [`Options::DONT_GUNZIP`] is set.
pub fn decode(
	source: impl AsRef<[u8]>,
	alphabet: Alphabet,
	options: Options,
) -> Result<Vec<u8>, CodecError> {
	let bytes = decode_raw(source.as_ref(), 0, alphabet)?;

	gunzip(bytes, options)
}

/// Decodes `len` bytes of `source` starting at `offset`. Error positions are absolute.
pub fn decode_slice(
	source: &[u8],
	offset: usize,
	len: usize,
	alphabet: Alphabet,
	options: Options,
) -> Result<Vec<u8>, CodecError> {
	let bytes = decode_raw(window(source, offset, len)?, offset, alphabet)?;

	gunzip(bytes, options)
}

/// Decodes standard-alphabet text with automatic gunzip.
pub fn decode_standard(source: impl AsRef<[u8]>) -> Result<Vec<u8>, CodecError> {
	decode(source, Alphabet::Standard, Options::NONE)
}

/// Encodes full 3-byte groups and tracks line length across calls.
#[derive(Clone, Debug)]
pub(crate) struct GroupEncoder {
	symbols: &'static [u8; 64],
	break_lines: bool,
	line_length: usize,
}
impl GroupEncoder {
	pub(crate) fn new(alphabet: Alphabet, options: Options) -> Self {
		Self {
			symbols: alphabet.symbols(),
			break_lines: options.contains(Options::DO_BREAK_LINES),
			line_length: 0,
		}
	}

	pub(crate) fn encode_all(&mut self, source: &[u8], out: &mut Vec<u8>) {
		let mut chunks = source.chunks_exact(3);

		for group in chunks.by_ref() {
			self.push_group(group, out);
		}

		self.push_tail(chunks.remainder(), out);
	}

	pub(crate) fn push_group(&mut self, group: &[u8], out: &mut Vec<u8>) {
		encode_group(self.symbols, group, out);

		self.line_length += 4;

		if self.break_lines && self.line_length >= MAX_LINE_LENGTH {
			out.push(NEW_LINE);

			self.line_length = 0;
		}
	}

	/// Pads and writes the final 1 or 2 bytes; no newline follows a padded group.
	pub(crate) fn push_tail(&mut self, tail: &[u8], out: &mut Vec<u8>) {
		if !tail.is_empty() {
			encode_group(self.symbols, tail, out);
		}
	}
}

/// Collects non-whitespace symbols into quanta and decodes them.
#[derive(Clone, Debug)]
pub(crate) struct QuantumDecoder {
	table: &'static [u8; 256],
	quantum: [u8; 4],
	filled: usize,
	seen: usize,
	finished: bool,
}
impl QuantumDecoder {
	pub(crate) fn new(alphabet: Alphabet) -> Self {
		Self { table: alphabet.decode_table(), quantum: [0; 4], filled: 0, seen: 0, finished: false }
	}

	/// Feeds one input byte; returns true once the end marker has been consumed.
	pub(crate) fn push(
		&mut self,
		byte: u8,
		position: usize,
		out: &mut Vec<u8>,
	) -> Result<bool, CodecError> {
		if self.finished {
			return Ok(true);
		}

		self.seen += 1;

		match self.table[usize::from(byte)] {
			alphabet::WHITESPACE => return Ok(false),
			alphabet::INVALID => return Err(CodecError::InvalidCharacter { byte, position }),
			alphabet::PADDING if self.filled < 2 => return Err(CodecError::InvalidPadding),
			_ => {},
		}

		self.quantum[self.filled] = byte;
		self.filled += 1;

		if self.filled == 4 {
			self.filled = 0;
			self.finished = self.decode_quantum(out)?;
		}

		Ok(self.finished)
	}

	/// Validates the end state: `seen` counts every byte offered, whitespace included.
	pub(crate) fn finish(&self) -> Result<(), CodecError> {
		if self.seen > 0 && self.seen < 4 && !self.finished {
			return Err(CodecError::TooShort { len: self.seen });
		}
		if self.filled != 0 {
			return Err(CodecError::InvalidPadding);
		}

		Ok(())
	}

	fn decode_quantum(&self, out: &mut Vec<u8>) -> Result<bool, CodecError> {
		let [a, b, c, d] = self.quantum;
		let sextet = |symbol: u8| u32::from(self.table[usize::from(symbol)]);

		if c == EQUALS_SIGN {
			if d != EQUALS_SIGN {
				return Err(CodecError::InvalidPadding);
			}

			let bits = (sextet(a) << 18) | (sextet(b) << 12);

			out.push((bits >> 16) as u8);

			return Ok(true);
		}
		if d == EQUALS_SIGN {
			let bits = (sextet(a) << 18) | (sextet(b) << 12) | (sextet(c) << 6);

			out.extend_from_slice(&[(bits >> 16) as u8, (bits >> 8) as u8]);

			return Ok(true);
		}

		let bits = (sextet(a) << 18) | (sextet(b) << 12) | (sextet(c) << 6) | sextet(d);

		out.extend_from_slice(&[(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]);

		Ok(false)
	}
}

fn encode_group(symbols: &[u8; 64], group: &[u8], out: &mut Vec<u8>) {
	let byte_at = |i: usize| group.get(i).copied().map(u32::from).unwrap_or(0);
	let bits = (byte_at(0) << 16) | (byte_at(1) << 8) | byte_at(2);
	let symbol = |shift: u32| symbols[((bits >> shift) & 0x3f) as usize];

	out.push(symbol(18));
	out.push(symbol(12));
	out.push(if group.len() > 1 { symbol(6) } else { EQUALS_SIGN });
	out.push(if group.len() > 2 { symbol(0) } else { EQUALS_SIGN });
}

fn decode_raw(source: &[u8], base: usize, alphabet: Alphabet) -> Result<Vec<u8>, CodecError> {
	if source.is_empty() {
		return Ok(Vec::new());
	}
	if source.len() < 4 {
		return Err(CodecError::TooShort { len: source.len() });
	}

	let mut decoder = QuantumDecoder::new(alphabet);
	let mut out = Vec::with_capacity(source.len() / 4 * 3);

	for (i, byte) in source.iter().enumerate() {
		if decoder.push(*byte, base + i, &mut out)? {
			break;
		}
	}

	decoder.finish()?;

	Ok(out)
}

fn gunzip(bytes: Vec<u8>, options: Options) -> Result<Vec<u8>, CodecError> {
	if options.contains(Options::DONT_GUNZIP) || !is_gzip(&bytes) {
		return Ok(bytes);
	}

	let mut inflated = Vec::with_capacity(bytes.len() * 2);

	GzDecoder::new(bytes.as_slice()).read_to_end(&mut inflated).map_err(CodecError::Gzip)?;

	Ok(inflated)
}

fn window(source: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
	offset
		.checked_add(len)
		.and_then(|end| source.get(offset..end))
		.ok_or(CodecError::OutOfBounds { offset, len, source_len: source.len() })
}

fn is_gzip(bytes: &[u8]) -> bool {
	bytes.len() >= 4 && bytes[..2] == GZIP_MAGIC
}

fn encoded_len(len: usize, options: Options) -> usize {
	let symbols = len.div_ceil(3) * 4;

	if options.contains(Options::DO_BREAK_LINES) {
		symbols + symbols / MAX_LINE_LENGTH
	} else {
		symbols
	}
}

fn ascii_to_string(bytes: Vec<u8>) -> String {
	bytes.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encodes_rfc4648_vectors() {
		let vectors = [
			("", ""),
			("f", "Zg=="),
			("fo", "Zm8="),
			("foo", "Zm9v"),
			("foob", "Zm9vYg=="),
			("fooba", "Zm9vYmE="),
			("foobar", "Zm9vYmFy"),
		];

		for (plain, encoded) in vectors {
			assert_eq!(encode_standard(plain.as_bytes()), encoded);
			assert_eq!(
				decode_standard(encoded).expect("RFC 4648 vector should decode."),
				plain.as_bytes()
			);
		}
	}

	#[test]
	fn url_safe_and_ordered_swap_symbols() {
		let bytes = [0xfb, 0xff, 0xbf];

		assert_eq!(encode_standard(&bytes), "+/+/");
		assert_eq!(
			encode(&bytes, Alphabet::UrlSafe, Options::NONE).expect("URL-safe encode should work."),
			"-_-_"
		);
		assert_eq!(
			encode(&[0, 0, 0], Alphabet::Ordered, Options::NONE)
				.expect("Ordered encode should work."),
			"----"
		);
	}

	#[test]
	fn ordered_encoding_preserves_numeric_order() {
		let values = [0_u32, 1, 63, 64, 4_095, 65_536, 1 << 20, (1 << 24) - 1];
		let encoded: Vec<String> = values
			.iter()
			.map(|value| {
				let bytes = value.to_be_bytes();

				encode(&bytes[1..], Alphabet::Ordered, Options::NONE)
					.expect("Ordered encode should work.")
			})
			.collect();

		assert!(encoded.windows(2).all(|pair| pair[0] < pair[1]), "{encoded:?}");
	}

	#[test]
	fn breaks_lines_every_76_symbols() {
		let source = [7_u8; 57];
		let encoded = encode(&source, Alphabet::Standard, Options::DO_BREAK_LINES)
			.expect("Line-broken encode should work.");

		assert_eq!(encoded.len(), 77);
		assert!(encoded.ends_with('\n'));

		let longer = encode(&[7_u8; 60], Alphabet::Standard, Options::DO_BREAK_LINES)
			.expect("Line-broken encode should work.");

		assert_eq!(longer.find('\n'), Some(76));
		assert_eq!(
			decode_standard(&longer).expect("Line breaks should be ignored while decoding."),
			vec![7_u8; 60]
		);
	}

	#[test]
	fn decode_rejects_malformed_input() {
		assert!(matches!(decode_standard("Zm"), Err(CodecError::TooShort { len: 2 })));
		assert!(matches!(
			decode_standard("Zm9v*A=="),
			Err(CodecError::InvalidCharacter { byte: b'*', position: 4 })
		));
		assert!(matches!(decode_standard("Z==="), Err(CodecError::InvalidPadding)));
		assert!(matches!(decode_standard("Zm=v"), Err(CodecError::InvalidPadding)));
		assert!(matches!(decode_standard("Zm9vYg"), Err(CodecError::InvalidPadding)));
		assert!(matches!(
			decode("-_-_", Alphabet::Standard, Options::NONE),
			Err(CodecError::InvalidCharacter { byte: b'-', position: 0 })
		));
		assert!(decode_standard("").expect("Empty input should decode.").is_empty());
	}

	#[test]
	fn decode_stops_at_end_marker_and_skips_whitespace() {
		assert_eq!(decode_standard("Zm8=ignored").expect("Padding should end input."), b"fo");
		assert_eq!(decode_standard(" Zm\r\n9v\t").expect("Whitespace should be skipped."), b"foo");
	}

	#[test]
	fn gzip_framing_round_trips() {
		let source = b"alice|01234567890123456789|1300".repeat(8);
		let encoded = encode(&source, Alphabet::Standard, Options::GZIP)
			.expect("Gzip encode should work.");
		let raw = decode(&encoded, Alphabet::Standard, Options::DONT_GUNZIP)
			.expect("Raw decode should work.");

		assert_eq!(raw[..2], GZIP_MAGIC);
		assert_eq!(decode_standard(&encoded).expect("Gzip decode should work."), source);
	}

	#[test]
	fn slice_variants_validate_windows() {
		assert_eq!(
			encode_slice(b"xxfooxx", 2, 3, Alphabet::Standard, Options::NONE)
				.expect("Slice encode should work."),
			"Zm9v"
		);
		assert_eq!(
			decode_slice(b"..Zm9v..", 2, 4, Alphabet::Standard, Options::NONE)
				.expect("Slice decode should work."),
			b"foo"
		);

		let err = encode_slice(b"foo", 2, 5, Alphabet::Standard, Options::NONE)
			.expect_err("Out of range window must be rejected.");

		assert!(matches!(err, CodecError::OutOfBounds { offset: 2, len: 5, source_len: 3 }));
		assert!(!err.is_malformed());
		assert!(matches!(
			decode_slice(b"..Zm*v", 2, 4, Alphabet::Standard, Options::NONE),
			Err(CodecError::InvalidCharacter { position: 4, .. })
		));
	}
}
