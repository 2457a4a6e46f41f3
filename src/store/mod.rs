//! Queries over the data store, one module per table.
//!
//! Handlers pass the pool (or a transaction) in explicitly and get plain
//! values back; nothing here knows about requests or sessions.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

/// The first 15 characters of a text, used as the display form of posts and comments.
pub(crate) fn excerpt(text: &str) -> &str {
	match text.char_indices().nth(15) {
		Some((end, _)) => &text[..end],
		None => text,
	}
}
