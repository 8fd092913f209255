use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Message {
	pub id: i64,
	pub sender_id: i64,
	pub recipient_id: i64,
	pub content: String,
	pub is_read: bool,
	pub date_read: Option<DateTime<Utc>>,
	pub message_sent: DateTime<Utc>,
	pub sender_deleted: bool,
	pub recipient_deleted: bool,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub known_as: String,
	pub photo_url: Option<String>,
	pub last_active: DateTime<Utc>,
}

/// Display data of one side of a message.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Participant {
	pub id: i64,
	pub known_as: String,
	pub photo_url: Option<String>,
}

impl From<&User> for Participant {
	fn from(value: &User) -> Self {
		Self {
			id: value.id,
			known_as: value.known_as.clone(),
			photo_url: value.photo_url.clone(),
		}
	}
}
