use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
	response::{IntoResponse, Redirect},
};
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	session, store, AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and setting a password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Maps unique violations on the user table to the field that caused them.
fn signup_conflict(error: sqlx::Error) -> RouteError {
	if let sqlx::Error::Database(ref database) = error {
		if database.is_unique_violation() {
			if database.message().contains("user.username") {
				return Error::UsernameTaken.into();
			}

			if database.message().contains("user.email") {
				return Error::EmailTaken.into();
			}
		}
	}

	RouteError::from(error)
}

async fn start_session<'c, E>(executor: E, user_id: Uuid) -> Result<model::Session, sqlx::Error>
where
	E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
	sqlx::query_as::<_, model::Session>(
		"INSERT INTO session (id, user_id, created_at) VALUES (?, ?, ?) RETURNING id, created_at",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(Utc::now())
	.fetch_one(executor)
	.await
}

/// Log in
/// Logs in to an account, returning an associated session cookie.
/// With a `next` path, the client is redirected there instead.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"), redirect = "Logged in, continue to `next`.")]
pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<model::LoginQuery>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = store::user::find_by_username(&state.database, &auth.username).await?;

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let session = start_session(&state.database, user.id).await?;
	let cookie = [(header::SET_COOKIE, session::create_cookie(session.id).to_string())];

	tracing::info!(username = %user.username, "logged in");

	Ok(match query.next {
		Some(next) => (cookie, Redirect::to(&next)).into_response(),
		None => (cookie, Json(session)).into_response(),
	})
}

/// Log out
/// Logs out of the authenticated account.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = ?")
		.bind(session.id)
		.execute(&database)
		.await?;

	// Clear the session cookie
	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	))
}

/// Sign up
/// Registers a new account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"))]
pub async fn signup(
	State(state): State<AppState>,
	Json(auth): Json<model::SignupInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, password, created_at) VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(&auth.email)
	.bind(&auth.username)
	.bind(&hashed[..])
	.bind(Utc::now())
	.execute(&mut *tx)
	.await
	.map_err(signup_conflict)?;

	let session = start_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	tracing::info!(username = %auth.username, "signed up");

	let cookie = session::create_cookie(session.id);

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)))
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}

/// Change password
/// Replaces the password of the authenticated user after checking the current one.
#[route(tag = tag::AUTH, response(status = 204, description = "Password changed."))]
pub async fn change_password(
	State(state): State<AppState>,
	session: Session,
	Json(input): Json<model::PasswordChangeInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = session.user;
	let current =
		hash_password(&state.hasher, &input.old_password, &user.id).map_err(Error::Argon)?;

	if user.password != current {
		return Err(Error::IncorrectPassword.into());
	}

	let hashed =
		hash_password(&state.hasher, &input.new_password, &user.id).map_err(Error::Argon)?;

	sqlx::query(r#"UPDATE "user" SET password = ? WHERE id = ?"#)
		.bind(&hashed[..])
		.bind(user.id)
		.execute(&state.database)
		.await?;

	tracing::info!(username = %user.username, "changed password");

	Ok(StatusCode::NO_CONTENT)
}
