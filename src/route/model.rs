use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An entity id taken from the path.
///
/// Ids are opaque to clients, so anything is accepted here. An id that is
/// not a UUID simply matches nothing.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: String,
}

impl IdInput {
	pub fn uuid(&self) -> Option<Uuid> {
		Uuid::parse_str(&self.id).ok()
	}
}

/// Acknowledges an operation that has no other result.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Acknowledgement {
	pub message: Cow<'static, str>,
}

impl Acknowledgement {
	pub const fn new(message: &'static str) -> Self {
		Self {
			message: Cow::Borrowed(message),
		}
	}
}

/// Lenient timestamp parsing for request bodies.
///
/// Accepts RFC 3339 (`2024-01-01T08:00:00Z`) as well as the naive forms that
/// `datetime-local` inputs produce (`2024-01-01T08:00:00`, `2024-01-01T08:00`),
/// which are read as UTC.
pub mod timestamp {
	use chrono::{DateTime, NaiveDateTime, Utc};
	use serde::{de, Deserialize, Deserializer};

	const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

	pub fn parse(input: &str) -> Option<DateTime<Utc>> {
		let input = input.trim();

		if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
			return Some(timestamp.with_timezone(&Utc));
		}

		NAIVE_FORMATS
			.iter()
			.find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
			.map(|naive| naive.and_utc())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let input = String::deserialize(deserializer)?;

		parse(&input)
			.ok_or_else(|| de::Error::custom(format!("invalid timestamp `{input}`")))
	}

	pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Option::<String>::deserialize(deserializer)? {
			Some(input) if !input.trim().is_empty() => parse(&input)
				.map(Some)
				.ok_or_else(|| de::Error::custom(format!("invalid timestamp `{input}`"))),
			_ => Ok(None),
		}
	}
}

#[cfg(test)]
mod test {
	use chrono::{TimeZone, Utc};

	use super::timestamp;

	#[test]
	fn test_timestamp_formats() {
		let expected = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

		assert_eq!(timestamp::parse("2024-01-01T09:00:00Z"), Some(expected));
		assert_eq!(timestamp::parse("2024-01-01T10:00:00+01:00"), Some(expected));
		assert_eq!(timestamp::parse("2024-01-01T09:00:00"), Some(expected));
		assert_eq!(timestamp::parse("2024-01-01T09:00:00.000"), Some(expected));
		assert_eq!(timestamp::parse("2024-01-01T09:00"), Some(expected));
	}

	#[test]
	fn test_id_input() {
		let id = uuid::Uuid::new_v4();

		assert_eq!(super::IdInput { id: id.to_string() }.uuid(), Some(id));
		assert_eq!(super::IdInput { id: "abc".into() }.uuid(), None);
	}

	#[test]
	fn test_timestamp_rejects_garbage() {
		assert_eq!(timestamp::parse("tomorrow"), None);
		assert_eq!(timestamp::parse("2024-13-01T09:00"), None);
	}
}
