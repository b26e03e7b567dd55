//! Strongly typed identifiers for path segments sent to the provider.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
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
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (activity, gear).
		kind: &'static str,
	},
	/// The identifier contains characters that cannot appear in a path segment.
	#[error("{kind} identifier contains an invalid character: {found:?}.")]
	InvalidCharacter {
		/// Kind of identifier (activity, gear).
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (activity, gear).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ActivityId, "Numeric identifier of a Strava activity.", "Activity", validate_numeric }
def_id! { GearId, "Identifier of a bike or pair of shoes (e.g. `b12345`).", "Gear", validate_segment }

impl From<u64> for ActivityId {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

fn validate_numeric(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_len(kind, view)?;

	match view.chars().find(|ch| !ch.is_ascii_digit()) {
		Some(found) => Err(IdentifierError::InvalidCharacter { kind, found }),
		None => Ok(()),
	}
}

fn validate_segment(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_len(kind, view)?;

	match view.chars().find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))) {
		Some(found) => Err(IdentifierError::InvalidCharacter { kind, found }),
		None => Ok(()),
	}
}

fn validate_len(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn activity_ids_accept_digits_only() {
		let id = ActivityId::new("13743554839").expect("Numeric activity id should be valid.");

		assert_eq!(id.as_ref(), "13743554839");
		assert_eq!(ActivityId::from(13_743_554_839_u64), id);
		assert!(matches!(
			ActivityId::new("12/../athlete"),
			Err(IdentifierError::InvalidCharacter { found: '/', .. })
		));
		assert!(ActivityId::new("").is_err());
		assert!(ActivityId::new(" 42").is_err(), "Leading whitespace must be rejected.");
	}

	#[test]
	fn gear_ids_reject_path_separators() {
		let gear = GearId::new("b12345").expect("Bike gear id should be valid.");

		assert_eq!(gear.to_string(), "b12345");
		assert!(GearId::new("g1/../../oauth").is_err());
		assert!(GearId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let gear: GearId =
			serde_json::from_str("\"g9876\"").expect("Gear id should deserialize successfully.");

		assert_eq!(gear.as_ref(), "g9876");
		assert!(serde_json::from_str::<GearId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<ActivityId>("\"abc\"").is_err());
	}
}
