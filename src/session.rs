use uuid::Uuid;

pub const COOKIE_NAME: &str = "sessionid";

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_cookie_round_trip() {
		let id = Uuid::new_v4();
		let cookie = create_cookie(id).to_string();
		let parsed = cookie::Cookie::parse(cookie).unwrap();

		assert_eq!(parsed.name(), COOKIE_NAME);
		assert_eq!(parsed.value(), id.to_string());
		assert_eq!(parsed.path(), Some("/"));
	}

	#[test]
	fn test_clear_cookie_expires_immediately() {
		let cookie = clear_cookie();

		assert_eq!(cookie.value(), "");
		assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
	}
}
