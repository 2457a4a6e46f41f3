use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Letters, digits and `@.+-_`, the same alphabet usernames appear in URLs with.
fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !(c.is_alphanumeric() || "@.+-_".contains(c)))
	{
		return Err(ValidationError::new("username_characters"));
	}

	Ok(())
}

/// Only local paths are accepted, so logging in can't send anyone off-site.
fn validate_next(next: &str) -> Result<(), ValidationError> {
	if !next.starts_with('/') || next.starts_with("//") {
		return Err(ValidationError::new("next_not_local"));
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The user's email address.
	#[serde(skip_serializing)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	pub username: String,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 150))]
	pub username: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginQuery {
	/// Where to go once logged in.
	#[validate(custom(function = "validate_next"))]
	pub next: Option<String>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SignupInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The username that is displayed to the public.
	#[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
	pub username: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PasswordChangeInput {
	#[validate(length(min = 1, max = 128))]
	pub old_password: String,
	#[validate(length(min = 8, max = 128))]
	pub new_password: String,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_usernames() {
		assert!(validate_username("leo.tolstoy+1").is_ok());
		assert!(validate_username("лев_толстой").is_ok());
		assert!(validate_username("leo/tolstoy").is_err());
		assert!(validate_username("leo tolstoy").is_err());
	}

	#[test]
	fn test_next_must_be_local() {
		assert!(validate_next("/create/").is_ok());
		assert!(validate_next("//evil.example").is_err());
		assert!(validate_next("https://evil.example").is_err());
	}
}
