use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Body of `POST /api/users/{userId}/messages`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageForCreation {
	/// Overwritten with the caller's id before use.
	#[serde(default)]
	pub sender_id: i64,
	pub recipient_id: i64,
	pub content: String,
	#[serde(skip_deserializing, default = "Utc::now")]
	pub message_sent: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageToReturn {
	pub id: i64,
	pub sender_id: i64,
	pub sender_known_as: String,
	pub sender_photo_url: Option<String>,
	pub recipient_id: i64,
	pub recipient_known_as: String,
	pub recipient_photo_url: Option<String>,
	pub content: String,
	pub is_read: bool,
	pub date_read: Option<DateTime<Utc>>,
	pub message_sent: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum MessageContainer {
	#[serde(alias = "inbox")]
	Inbox,
	#[serde(alias = "outbox")]
	Outbox,
	#[default]
	#[serde(alias = "unread")]
	Unread,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageQueryParams {
	pub page_number: u32,
	pub page_size: u32,
	/// Set from the path by the handler; whatever the client sends is discarded.
	pub user_id: i64,
	pub message_container: MessageContainer,
}

impl Default for MessageQueryParams {
	fn default() -> Self {
		Self {
			page_number: 1,
			page_size: DEFAULT_PAGE_SIZE,
			user_id: 0,
			message_container: MessageContainer::default(),
		}
	}
}

impl MessageQueryParams {
	pub fn normalized(self) -> Self {
		Self {
			page_number: self.page_number.max(1),
			page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
			..self
		}
	}
}
