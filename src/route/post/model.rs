pub use crate::route::model::PaginateInput;
pub use crate::store::{comment::Comment, group::Group, post::Post};

use std::borrow::Cow;

use aide::OperationInput;
use axum::{
	body::Bytes,
	extract::{FromRequest, Multipart, Request},
	http::header,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
	error::RouteError,
	extract::{Form, Never},
	paginate::Page,
	route::{
		auth::model::User,
		page::{Field, FormErrors},
	},
};

fn not_blank(text: &str) -> Result<(), ValidationError> {
	if text.trim().is_empty() {
		let mut error = ValidationError::new("blank");
		error.message = Some(Cow::Borrowed("This field is required."));

		return Err(error);
	}

	Ok(())
}

/// A feed that is not tied to a group or author, such as the home page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FeedPage {
	pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupPage {
	pub group: Group,
	pub page_obj: Page<Post>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfilePage {
	pub author: User,
	pub page_obj: Page<Post>,
	/// Whether the viewer follows the author. Always `false` for anonymous viewers.
	pub following: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostPage {
	pub post: Post,
	/// Comments under the post, oldest first.
	pub comments: Vec<Comment>,
	/// The comment form.
	pub form: Vec<Field>,
}

/// The form for writing a new post or editing an existing one.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostFormPage {
	pub fields: Vec<Field>,
	/// The choices for the `group` field.
	pub groups: Vec<Group>,
	/// The values to fill the form with.
	pub values: PostValues,
	pub errors: FormErrors,
	pub is_edit: bool,
	/// The post being edited.
	pub post: Option<Post>,
}

/// The text fields of a post form, as submitted.
#[derive(Debug, Default, Deserialize, Serialize, Validate, JsonSchema)]
pub struct PostValues {
	#[serde(default)]
	#[validate(length(max = 10000), custom(function = "not_blank"))]
	pub text: String,
	/// The id of the group to file the post under. Empty for none.
	#[serde(default)]
	pub group: Option<String>,
}

/// A submitted post form, sent either url-encoded or as `multipart/form-data`
/// when it carries an image.
#[derive(Debug)]
pub struct Submission {
	pub values: PostValues,
	/// The raw upload, if a non-empty `image` field was sent.
	pub image: Option<Bytes>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for Submission
where
	S: Send + Sync,
{
	type Rejection = RouteError<Never>;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let is_multipart = req
			.headers()
			.get(header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value.starts_with("multipart/form-data"));

		if !is_multipart {
			let Form(values) = Form::<PostValues>::from_request(req, state).await?;

			return Ok(Self {
				values,
				image: None,
			});
		}

		let mut multipart = Multipart::from_request(req, state).await?;
		let mut values = PostValues::default();
		let mut image = None;

		while let Some(field) = multipart.next_field().await? {
			let name = field.name().unwrap_or_default().to_owned();

			match name.as_str() {
				"text" => values.text = field.text().await?,
				"group" => values.group = Some(field.text().await?),
				"image" => {
					let bytes = field.bytes().await?;

					if !bytes.is_empty() {
						image = Some(bytes);
					}
				}
				_ => {}
			}
		}

		Ok(Self { values, image })
	}
}

impl OperationInput for Submission {}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentInput {
	#[serde(default)]
	#[validate(length(max = 10000), custom(function = "not_blank"))]
	pub text: String,
}

pub fn post_fields() -> Vec<Field> {
	vec![
		Field {
			name: "text",
			label: "Post text",
			help_text: "Text of the new post",
			required: true,
		},
		Field {
			name: "group",
			label: "Group",
			help_text: "Group the post will belong to",
			required: false,
		},
		Field {
			name: "image",
			label: "Image",
			help_text: "Picture shown with the post",
			required: false,
		},
	]
}

pub fn comment_fields() -> Vec<Field> {
	vec![Field {
		name: "text",
		label: "Comment",
		help_text: "Text of the comment",
		required: true,
	}]
}
