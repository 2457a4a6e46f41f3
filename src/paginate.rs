//! Splits ordered feeds into fixed-size pages.
//!
//! Requested page numbers outside `1..=total_pages` are clamped to the
//! nearest valid page, and an empty feed still has a single (empty) page.

use schemars::JsonSchema;
use serde::Serialize;

/// A single page of a feed together with the metadata needed to
/// link to its neighbours.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	/// The items on this page, in feed order.
	pub items: Vec<T>,
	/// The page number (1-indexed).
	pub number: u32,
	/// The total number of pages in the feed.
	pub total_pages: u32,
	/// The total number of items in the feed.
	pub count: u64,
	pub has_next: bool,
	pub has_previous: bool,
}

/// Page arithmetic for a feed of `count` items.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	count: u64,
	per_page: u32,
}

impl Paginator {
	pub fn new(count: u64, per_page: u32) -> Self {
		Self {
			count,
			per_page: per_page.max(1),
		}
	}

	pub fn total_pages(&self) -> u32 {
		let pages = self.count.div_ceil(u64::from(self.per_page)).max(1);

		u32::try_from(pages).unwrap_or(u32::MAX)
	}

	/// Maps any requested page number onto an existing page.
	pub fn clamp(&self, number: i64) -> u32 {
		let clamped = number.clamp(1, i64::from(self.total_pages()));

		u32::try_from(clamped).unwrap_or(1)
	}

	/// The number of items preceding the given page.
	pub fn offset(&self, number: u32) -> i64 {
		i64::from(number.saturating_sub(1)) * i64::from(self.per_page)
	}

	pub fn limit(&self) -> i64 {
		i64::from(self.per_page)
	}

	/// Wraps the items of an already clamped page.
	pub fn page<T>(&self, items: Vec<T>, number: u32) -> Page<T> {
		let total_pages = self.total_pages();

		Page {
			items,
			number,
			total_pages,
			count: self.count,
			has_next: number < total_pages,
			has_previous: number > 1,
		}
	}
}

/// Returns the requested page of an in-memory feed.
pub fn paginate<T: Clone>(items: &[T], number: i64, per_page: u32) -> Page<T> {
	let paginator = Paginator::new(items.len() as u64, per_page);
	let number = paginator.clamp(number);

	let start = usize::try_from(paginator.offset(number))
		.unwrap_or(usize::MAX)
		.min(items.len());
	let end = start
		.saturating_add(per_page.max(1) as usize)
		.min(items.len());

	paginator.page(items[start..end].to_vec(), number)
}
