use axum::{
	body::Bytes,
	extract::{Path, State},
};
use macros::route;

use crate::{
	extract::{Form, Json, MaybeSession, Query, Session},
	media::{Image, MediaStore},
	openapi::tag,
	route::page::{FormErrors, Outcome, Redirect},
	store::{
		self,
		post::{Feed, PostInput},
	},
	AppState, Database,
};

use super::{model, Error, RouteError};

/// A submission that passed validation, before its image is stored.
struct ValidPost {
	text: String,
	group_id: Option<i64>,
	image: Option<Image>,
}

/// Checks a submitted post form.
///
/// Returns either the values to persist or the errors to show next to each
/// field. Only looking up the chosen group can fail outright.
async fn validate_post(
	database: &Database,
	values: &model::PostValues,
	image: Option<Bytes>,
) -> Result<Result<ValidPost, FormErrors>, sqlx::Error> {
	let mut errors = validator::Validate::validate(values)
		.err()
		.map(FormErrors::from)
		.unwrap_or_default();

	let group = values.group.as_deref().map(str::trim).filter(|id| !id.is_empty());
	let group_id = match group.map(str::parse::<i64>) {
		None => None,
		Some(Ok(id)) if store::group::find(database, id).await?.is_some() => Some(id),
		Some(_) => {
			errors.add("group", "Select a valid choice.");
			None
		}
	};

	let image = match image {
		None => None,
		Some(bytes) => {
			let image = Image::from_bytes(bytes);

			if image.is_none() {
				errors.add(
					"image",
					"Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
				);
			}

			image
		}
	};

	if !errors.is_empty() {
		return Ok(Err(errors));
	}

	Ok(Ok(ValidPost {
		text: values.text.clone(),
		group_id,
		image,
	}))
}

/// Stores the image of a validated post, if it has one.
async fn into_input(media: &MediaStore, post: ValidPost) -> Result<PostInput, RouteError> {
	let image = match &post.image {
		Some(image) => Some(media.save(image).await?),
		None => None,
	};

	Ok(PostInput {
		text: post.text,
		group_id: post.group_id,
		image,
	})
}

async fn form_page(
	database: &Database,
	values: model::PostValues,
	errors: FormErrors,
	post: Option<model::Post>,
) -> Result<model::PostFormPage, RouteError> {
	Ok(model::PostFormPage {
		fields: model::post_fields(),
		groups: store::group::list(database).await?,
		values,
		errors,
		is_edit: post.is_some(),
		post,
	})
}

fn detail_url(post_id: i64) -> String {
	format!("/posts/{post_id}/")
}

/// Home feed
/// Returns a page of all posts, newest first. Responses are cached for a short while.
#[route(tag = tag::POST)]
pub async fn index(
	State(state): State<AppState>,
	Query(paginate): Query<model::PaginateInput>,
) -> Result<Json<model::FeedPage>, RouteError> {
	let page_obj =
		store::post::page(&state.database, Feed::All, paginate.page, state.page_size).await?;

	Ok(Json(model::FeedPage { page_obj }))
}

/// Group feed
/// Returns a page of the posts filed under a group, newest first.
#[route(tag = tag::POST)]
pub async fn group_posts(
	State(state): State<AppState>,
	Path(slug): Path<String>,
	Query(paginate): Query<model::PaginateInput>,
) -> Result<Json<model::GroupPage>, RouteError> {
	let group = store::group::find_by_slug(&state.database, &slug)
		.await?
		.ok_or(Error::UnknownGroup(slug))?;

	let page_obj = store::post::page(
		&state.database,
		Feed::Group(group.id),
		paginate.page,
		state.page_size,
	)
	.await?;

	tracing::debug!(%group, count = page_obj.count, "group feed");

	Ok(Json(model::GroupPage { group, page_obj }))
}

/// Profile
/// Returns a page of an author's posts and whether the viewer follows them.
#[route(tag = tag::POST)]
pub async fn profile(
	State(state): State<AppState>,
	MaybeSession(session): MaybeSession,
	Path(username): Path<String>,
	Query(paginate): Query<model::PaginateInput>,
) -> Result<Json<model::ProfilePage>, RouteError> {
	let author = store::user::find_by_username(&state.database, &username)
		.await?
		.ok_or(Error::UnknownUser(username))?;

	let page_obj = store::post::page(
		&state.database,
		Feed::Author(author.id),
		paginate.page,
		state.page_size,
	)
	.await?;

	let following = match session {
		Some(session) => {
			store::follow::is_following(&state.database, session.user.id, author.id).await?
		}
		None => false,
	};

	Ok(Json(model::ProfilePage {
		author,
		page_obj,
		following,
	}))
}

/// Post
/// Returns a single post with its comments and the comment form.
#[route(tag = tag::POST)]
pub async fn post_detail(
	State(database): State<Database>,
	Path(post_id): Path<i64>,
) -> Result<Json<model::PostPage>, RouteError> {
	let post = store::post::find(&database, post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	let comments = store::comment::for_post(&database, post_id).await?;

	Ok(Json(model::PostPage {
		post,
		comments,
		form: model::comment_fields(),
	}))
}

/// New post form
#[route(tag = tag::POST)]
pub async fn create_form(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<model::PostFormPage>, RouteError> {
	let page = form_page(
		&database,
		model::PostValues::default(),
		FormErrors::default(),
		None,
	)
	.await?;

	Ok(Json(page))
}

/// Create post
/// Publishes a new post and redirects to the author's profile.
/// Invalid submissions return the form with field errors instead.
#[route(tag = tag::POST, redirect = "Post created, continue to the author's profile.")]
pub async fn create_post(
	State(state): State<AppState>,
	session: Session,
	model::Submission { values, image }: model::Submission,
) -> Result<Outcome<model::PostFormPage>, RouteError> {
	let post = match validate_post(&state.database, &values, image).await? {
		Ok(post) => post,
		Err(errors) => {
			let page = form_page(&state.database, values, errors, None).await?;

			return Ok(Outcome::Render(page));
		}
	};

	let input = into_input(&state.media, post).await?;
	let post_id = store::post::create(&state.database, session.user.id, &input).await?;

	tracing::info!(post_id, author = %session.user.username, "created post");

	Ok(Outcome::redirect(format!("/profile/{}/", session.user.username)))
}

/// Edit post form
/// Returns the form prefilled with the post. Only the author may edit a post,
/// anyone else is sent to the post instead.
#[route(tag = tag::POST, redirect = "Not the author, continue to the post.")]
pub async fn edit_form(
	State(database): State<Database>,
	session: Session,
	Path(post_id): Path<i64>,
) -> Result<Outcome<model::PostFormPage>, RouteError> {
	let post = store::post::find(&database, post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	if post.author_id != session.user.id {
		return Ok(Outcome::redirect(detail_url(post_id)));
	}

	let values = model::PostValues {
		text: post.text.clone(),
		group: post.group_id.map(|id| id.to_string()),
	};

	let page = form_page(&database, values, FormErrors::default(), Some(post)).await?;

	Ok(Outcome::Render(page))
}

/// Edit post
/// Updates a post in place and redirects to it. The image is only replaced
/// when a new one is uploaded.
#[route(tag = tag::POST, redirect = "Post saved, or not the author; continue to the post.")]
pub async fn edit_post(
	State(state): State<AppState>,
	session: Session,
	Path(post_id): Path<i64>,
	model::Submission { values, image }: model::Submission,
) -> Result<Outcome<model::PostFormPage>, RouteError> {
	let post = store::post::find(&state.database, post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	if post.author_id != session.user.id {
		tracing::warn!(post_id, user = %session.user.username, "refused edit by non-author");

		return Ok(Outcome::redirect(detail_url(post_id)));
	}

	let valid = match validate_post(&state.database, &values, image).await? {
		Ok(valid) => valid,
		Err(errors) => {
			let page = form_page(&state.database, values, errors, Some(post)).await?;

			return Ok(Outcome::Render(page));
		}
	};

	let input = into_input(&state.media, valid).await?;
	store::post::update(&state.database, post_id, &input).await?;

	tracing::info!(%post, post_id, "edited post");

	Ok(Outcome::redirect(detail_url(post_id)))
}

/// Add comment
/// Appends a comment to a post. Blank comments are dropped; either way the
/// client is sent back to the post.
#[route(tag = tag::POST, redirect = "Continue to the post.")]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(post_id): Path<i64>,
	Form(input): Form<model::CommentInput>,
) -> Result<Redirect, RouteError> {
	if store::post::find(&database, post_id).await?.is_none() {
		return Err(Error::UnknownPost(post_id).into());
	}

	if validator::Validate::validate(&input).is_ok() {
		let comment_id =
			store::comment::create(&database, post_id, session.user.id, &input.text).await?;

		tracing::info!(post_id, comment_id, "added comment");
	}

	Ok(Redirect::to(detail_url(post_id)))
}
