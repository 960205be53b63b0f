//! Strongly typed Duo keys with length validation and redacted formatting for secrets.

// std
use std::ops::Deref;
// crates.io
use rand::Rng;
// self
use crate::_prelude::*;

macro_rules! def_key {
	($name:ident, $doc:literal, $kind:literal, $rule:expr, public) => {
		def_key!(@common $name, $doc, $kind, $rule);

		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!(stringify!($name), "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
	($name:ident, $doc:literal, $kind:literal, $rule:expr, secret) => {
		def_key!(@common $name, $doc, $kind, $rule);

		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
	(@common $name:ident, $doc:literal, $kind:literal, $rule:expr) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Length rule enforced by [`Self::new`].
			pub const RULE: KeyLength = $rule;

			/// Creates a new key after length validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, KeyError> {
				let view = value.as_ref();

				Self::RULE.check($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Returns the raw key material. Callers must avoid logging secret keys.
			pub fn expose(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = KeyError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::RULE.check($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl FromStr for $name {
			type Err = KeyError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

/// Exact length of an integration key, in characters.
pub const INTEGRATION_KEY_LEN: usize = 20;
/// Exact length of a secret key, in characters.
pub const SECRET_KEY_LEN: usize = 40;
/// Minimum length of an application key, in characters.
pub const APPLICATION_KEY_MIN_LEN: usize = 40;

const GENERATED_KEY_LEN: usize = 42;
const GENERATED_KEY_SYMBOLS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Character-count rule applied to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyLength {
	/// The key must have exactly this many characters.
	Exact(usize),
	/// The key must have at least this many characters.
	AtLeast(usize),
}
impl KeyLength {
	/// Returns `true` when `view` satisfies the rule.
	pub fn accepts(self, view: &str) -> bool {
		let found = view.chars().count();

		match self {
			KeyLength::Exact(expected) => found == expected,
			KeyLength::AtLeast(min) => found >= min,
		}
	}

	fn check(self, kind: &'static str, view: &str) -> Result<(), KeyError> {
		if self.accepts(view) {
			return Ok(());
		}

		let found = view.chars().count();

		Err(match self {
			KeyLength::Exact(expected) => KeyError::Length { kind, expected, found },
			KeyLength::AtLeast(min) => KeyError::TooShort { kind, min, found },
		})
	}
}

/// Error returned when key validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum KeyError {
	/// The key does not have the exact required length.
	#[error("{kind} must be exactly {expected} characters, found {found}.")]
	Length {
		/// Kind of key (integration, secret, application).
		kind: &'static str,
		/// Required character count.
		expected: usize,
		/// Actual character count.
		found: usize,
	},
	/// The key is shorter than the required minimum.
	#[error("{kind} must be at least {min} characters, found {found}.")]
	TooShort {
		/// Kind of key (integration, secret, application).
		kind: &'static str,
		/// Minimum character count.
		min: usize,
		/// Actual character count.
		found: usize,
	},
}

def_key! {
	IntegrationKey,
	"Duo integration key identifying the application to the verifier.",
	"Integration key",
	KeyLength::Exact(INTEGRATION_KEY_LEN),
	public
}
def_key! {
	SecretKey,
	"Secret shared with the Duo verifier; signs the service tier and admin API requests.",
	"Secret key",
	KeyLength::Exact(SECRET_KEY_LEN),
	secret
}
def_key! {
	ApplicationKey,
	"Secret known only to the connector; signs the application tier.",
	"Application key",
	KeyLength::AtLeast(APPLICATION_KEY_MIN_LEN),
	secret
}

impl ApplicationKey {
	/// Generates a fresh 42-character key of uppercase letters and digits from the thread-local
	/// CSPRNG.
	pub fn generate() -> Self {
		let mut rng = rand::rng();
		let key = (0..GENERATED_KEY_LEN)
			.map(|_| {
				char::from(GENERATED_KEY_SYMBOLS[rng.random_range(0..GENERATED_KEY_SYMBOLS.len())])
			})
			.collect();

		Self(key)
	}
}
