use axum::extract::{Path, State};
use macros::route;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	route::{model::PaginateInput, page::Redirect, post::model::FeedPage},
	store,
	AppState, Database,
};

use super::{Error, RouteError};

fn profile_url(username: &str) -> String {
	format!("/profile/{username}/")
}

/// Subscriptions feed
/// Returns a page of posts by the authors you follow, newest first.
#[route(tag = tag::FOLLOW)]
pub async fn follow_index(
	State(state): State<AppState>,
	session: Session,
	Query(paginate): Query<PaginateInput>,
) -> Result<Json<FeedPage>, RouteError> {
	let page_obj = store::follow::feed_for(
		&state.database,
		session.user.id,
		paginate.page,
		state.page_size,
	)
	.await?;

	Ok(Json(FeedPage { page_obj }))
}

/// Follow author
/// Subscribes to an author and redirects to their profile.
/// Following yourself, or someone you already follow, changes nothing.
#[route(tag = tag::FOLLOW, redirect = "Continue to the author's profile.")]
pub async fn profile_follow(
	State(database): State<Database>,
	session: Session,
	Path(username): Path<String>,
) -> Result<Redirect, RouteError> {
	let author = store::user::find_by_username(&database, &username)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.clone()))?;

	if store::follow::follow(&database, session.user.id, author.id).await? {
		tracing::info!(user = %session.user.username, author = %author.username, "followed");
	}

	Ok(Redirect::to(profile_url(&username)))
}

/// Unfollow author
/// Unsubscribes from an author and redirects to their profile.
#[route(tag = tag::FOLLOW, redirect = "Continue to the author's profile.")]
pub async fn profile_unfollow(
	State(database): State<Database>,
	session: Session,
	Path(username): Path<String>,
) -> Result<Redirect, RouteError> {
	let author = store::user::find_by_username(&database, &username)
		.await?
		.ok_or_else(|| Error::NotFollowing(username.clone()))?;

	if !store::follow::unfollow(&database, session.user.id, author.id).await? {
		return Err(Error::NotFollowing(username).into());
	}

	tracing::info!(user = %session.user.username, author = %author.username, "unfollowed");

	Ok(Redirect::to(profile_url(&username)))
}
