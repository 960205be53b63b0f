//! Streaming Base64 writers.
//!
//! [`EncoderWriter`] and [`DecoderWriter`] wrap any [`Write`] sink and emit the same bytes the
//! bulk functions would. Gzip framing composes from the outside: wrapping an [`EncoderWriter`]
//! in a [`flate2::write::GzEncoder`] with default compression reproduces
//! `encode(.., Options::GZIP)`.

// std
use std::io::{Error as IoError, ErrorKind, Result as IoResult, Write};
// self
use crate::codec::{Alphabet, CodecError, GroupEncoder, Options, QuantumDecoder};

/// Encodes everything written to it and forwards the text to the inner writer.
#[derive(Debug)]
pub struct EncoderWriter<W>
where
	W: Write,
{
	inner: W,
	encoder: GroupEncoder,
	pending: [u8; 3],
	pending_len: usize,
	scratch: Vec<u8>,
}
impl<W> EncoderWriter<W>
where
	W: Write,
{
	/// Creates an encoder. [`Options::DO_BREAK_LINES`] is honored; gzip is composed externally.
	pub fn new(inner: W, alphabet: Alphabet, options: Options) -> Self {
		Self {
			inner,
			encoder: GroupEncoder::new(alphabet, options),
			pending: [0; 3],
			pending_len: 0,
			scratch: Vec::new(),
		}
	}

	/// Writes the final padded group and returns the inner writer.
	pub fn finish(mut self) -> IoResult<W> {
		self.encoder.push_tail(&self.pending[..self.pending_len], &mut self.scratch);
		self.inner.write_all(&self.scratch)?;
		self.inner.flush()?;

		Ok(self.inner)
	}
}
impl<W> Write for EncoderWriter<W>
where
	W: Write,
{
	fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
		for byte in buf {
			self.pending[self.pending_len] = *byte;
			self.pending_len += 1;

			if self.pending_len == self.pending.len() {
				self.encoder.push_group(&self.pending, &mut self.scratch);

				self.pending_len = 0;
			}
		}

		let forwarded = self.inner.write_all(&self.scratch);

		self.scratch.clear();
		forwarded?;

		Ok(buf.len())
	}

	fn flush(&mut self) -> IoResult<()> {
		self.inner.flush()
	}
}

/// Decodes everything written to it and forwards the bytes to the inner writer.
///
/// Gzip-framed data is passed through untouched; callers that expect it wrap the inner writer in
/// a [`flate2::write::GzDecoder`].
///
/// The first decode error is latched: every later `write` fails and [`DecoderWriter::finish`]
/// returns it, so a stream is rejected exactly when bulk decoding would reject it.
#[derive(Debug)]
pub struct DecoderWriter<W>
where
	W: Write,
{
	inner: W,
	decoder: QuantumDecoder,
	position: usize,
	scratch: Vec<u8>,
	failure: Option<CodecError>,
}
impl<W> DecoderWriter<W>
where
	W: Write,
{
	/// Creates a decoder for the selected alphabet.
	pub fn new(inner: W, alphabet: Alphabet) -> Self {
		Self {
			inner,
			decoder: QuantumDecoder::new(alphabet),
			position: 0,
			scratch: Vec::new(),
			failure: None,
		}
	}

	/// Validates that the input ended on a quantum boundary and returns the inner writer.
	///
	/// Returns the latched error if any earlier `write` hit malformed input.
	pub fn finish(mut self) -> Result<W, CodecError> {
		if let Some(e) = self.failure.take() {
			return Err(e);
		}

		self.decoder.finish()?;
		self.inner.flush().map_err(CodecError::Sink)?;

		Ok(self.inner)
	}
}
impl<W> Write for DecoderWriter<W>
where
	W: Write,
{
	fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
		if let Some(e) = &self.failure {
			return Err(invalid_data(e));
		}

		for byte in buf {
			match self.decoder.push(*byte, self.position, &mut self.scratch) {
				Ok(true) => break,
				Ok(false) => self.position += 1,
				Err(e) => {
					let err = invalid_data(&e);

					self.scratch.clear();
					self.failure = Some(e);

					return Err(err);
				},
			}
		}

		let forwarded = self.inner.write_all(&self.scratch);

		self.scratch.clear();
		forwarded?;

		Ok(buf.len())
	}

	fn flush(&mut self) -> IoResult<()> {
		self.inner.flush()
	}
}

fn invalid_data(e: &CodecError) -> IoError {
	IoError::new(ErrorKind::InvalidData, e.to_string())
}

#[cfg(test)]
mod tests {
	// crates.io
	use flate2::{Compression, write::GzEncoder};
	// self
	use super::*;
	use crate::codec;

	struct FlakySink {
		fail_next: bool,
		data: Vec<u8>,
	}
	impl Write for FlakySink {
		fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
			if std::mem::take(&mut self.fail_next) {
				return Err(IoError::other("Sink is temporarily unavailable."));
			}

			self.data.extend_from_slice(buf);

			Ok(buf.len())
		}

		fn flush(&mut self) -> IoResult<()> {
			Ok(())
		}
	}

	fn stream_encode(source: &[u8], alphabet: Alphabet, options: Options, step: usize) -> String {
		let mut writer = EncoderWriter::new(Vec::new(), alphabet, options);

		for chunk in source.chunks(step) {
			writer.write_all(chunk).expect("Streaming encode should accept input.");
		}

		let bytes = writer.finish().expect("Streaming encode should finish.");

		String::from_utf8(bytes).expect("Encoded output should be ASCII.")
	}

	#[test]
	fn encoder_matches_bulk_for_every_split() {
		let source: Vec<u8> = (0..=200).collect();

		for alphabet in [Alphabet::Standard, Alphabet::UrlSafe, Alphabet::Ordered] {
			for options in [Options::NONE, Options::DO_BREAK_LINES] {
				let bulk = codec::encode(&source, alphabet, options).expect("Bulk encode works.");

				for step in [1, 2, 3, 5, 64] {
					assert_eq!(stream_encode(&source, alphabet, options, step), bulk);
				}
			}
		}
	}

	#[test]
	fn gzip_wrapped_encoder_matches_bulk() {
		let source = b"service|application|verification".repeat(20);
		let mut gz = GzEncoder::new(
			EncoderWriter::new(Vec::new(), Alphabet::UrlSafe, Options::NONE),
			Compression::default(),
		);

		gz.write_all(&source).expect("Gzip stream should accept input.");

		let encoded = gz
			.finish()
			.expect("Gzip stream should finish.")
			.finish()
			.expect("Base64 stream should finish.");

		assert_eq!(
			encoded,
			codec::encode(&source, Alphabet::UrlSafe, Options::GZIP)
				.expect("Bulk gzip encode works.")
				.into_bytes()
		);
	}

	#[test]
	fn decoder_matches_bulk() {
		let text = codec::encode(&[9_u8; 100], Alphabet::Ordered, Options::DO_BREAK_LINES)
			.expect("Bulk encode works.");
		let mut writer = DecoderWriter::new(Vec::new(), Alphabet::Ordered);

		for chunk in text.as_bytes().chunks(7) {
			writer.write_all(chunk).expect("Streaming decode should accept input.");
		}

		assert_eq!(writer.finish().expect("Streaming decode should finish."), vec![9_u8; 100]);
	}

	#[test]
	fn decoder_latches_the_first_error() {
		let mut writer = DecoderWriter::new(Vec::new(), Alphabet::Standard);
		let err = writer.write_all(b"Zm9v*").expect_err("`*` is not a Base64 symbol.");

		assert_eq!(err.kind(), ErrorKind::InvalidData);
		assert!(writer.write_all(b"YmFy").is_err(), "Input after an error must be refused.");
		assert!(matches!(
			writer.finish(),
			Err(CodecError::InvalidCharacter { byte: b'*', position: 4 })
		));
		assert!(codec::decode_standard(b"Zm9v*YmFy").is_err());
	}

	#[test]
	fn encoder_drops_output_of_a_failed_write() {
		let sink = FlakySink { fail_next: true, data: Vec::new() };
		let mut writer = EncoderWriter::new(sink, Alphabet::Standard, Options::NONE);

		assert!(writer.write_all(b"foo").is_err());

		writer.write_all(b"bar").expect("The sink recovers after one failure.");

		let sink = writer.finish().expect("Streaming encode should finish.");

		assert_eq!(sink.data, b"YmFy");
	}

	#[test]
	fn decoder_reports_bad_input() {
		let mut writer = DecoderWriter::new(Vec::new(), Alphabet::UrlSafe);
		let err = writer.write_all(b"ab+c").expect_err("`+` is not URL-safe.");

		assert_eq!(err.kind(), ErrorKind::InvalidData);

		let mut writer = DecoderWriter::new(Vec::new(), Alphabet::Standard);

		writer.write_all(b"Zm9vYg").expect("Partial quantum is buffered.");

		assert!(matches!(writer.finish(), Err(CodecError::InvalidPadding)));

		let mut writer = DecoderWriter::new(Vec::new(), Alphabet::Standard);

		writer.write_all(b"Zm").expect("Short input is buffered.");

		assert!(matches!(writer.finish(), Err(CodecError::TooShort { len: 2 })));
	}
}
