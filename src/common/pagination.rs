use axum::http::{header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

pub const PAGINATION: &str = "pagination";

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<T> {
	pub items: Vec<T>,
	pub current_page: u32,
	pub page_size: u32,
	pub total_count: u64,
	pub total_pages: u32,
}

/// Where a page starts once the total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
	pub current_page: u32,
	pub page_size: u32,
	pub total_pages: u32,
}

impl PageWindow {
	/// Requests past the last page land on the last page.
	pub fn new(
		total_count: u64,
		page_number: u32,
		page_size: u32,
	) -> Self {
		let page_size = page_size.max(1);
		let total_pages = total_count.div_ceil(page_size as u64) as u32;
		let current_page = page_number.clamp(1, total_pages.max(1));
		Self {
			current_page,
			page_size,
			total_pages,
		}
	}

	pub fn offset(&self) -> u64 {
		(self.current_page as u64 - 1) * self.page_size as u64
	}
}

impl<T> PagedList<T> {
	pub fn new(
		items: Vec<T>,
		total_count: u64,
		window: PageWindow,
	) -> Self {
		Self {
			items,
			current_page: window.current_page,
			page_size: window.page_size,
			total_count,
			total_pages: window.total_pages,
		}
	}

	pub fn map<U>(
		self,
		f: impl FnMut(T) -> U,
	) -> PagedList<U> {
		PagedList {
			items: self.items.into_iter().map(f).collect(),
			current_page: self.current_page,
			page_size: self.page_size,
			total_count: self.total_count,
			total_pages: self.total_pages,
		}
	}

	pub fn header(&self) -> PaginationHeader {
		PaginationHeader {
			current_page: self.current_page,
			items_per_page: self.page_size,
			total_items: self.total_count,
			total_pages: self.total_pages,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
	pub current_page: u32,
	pub items_per_page: u32,
	pub total_items: u64,
	pub total_pages: u32,
}

/// Writes the page metadata as a JSON `Pagination` header readable by browser clients.
pub fn add_pagination(
	headers: &mut HeaderMap,
	pagination: PaginationHeader,
) {
	if let Some(value) = serde_json::to_string(&pagination).ok().and_then(|json| HeaderValue::from_str(&json).ok()) {
		headers.insert(PAGINATION, value);
	}
	headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static("Pagination"));
}
