use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

/// Selects a page of a feed.
///
/// There is no range check here: feeds clamp numbers that are out of
/// range to their first or last page instead of failing.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct PaginateInput {
	/// The page number to return (1-indexed).
	#[serde(default = "one")]
	pub page: i64,
}

#[cfg(test)]
mod test {
	use super::PaginateInput;

	#[test]
	fn test_page_defaults_to_first() {
		let input: PaginateInput = serde_json::from_str("{}").unwrap();

		assert_eq!(input.page, 1);
	}

	#[test]
	fn test_page_must_be_a_number() {
		assert!(serde_json::from_str::<PaginateInput>(r#"{ "page": "last" }"#).is_err());
	}
}
