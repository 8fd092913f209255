//! Projections between message records and the request/response shapes.

use super::{
	entity::Message,
	schemas::{MessageForCreation, MessageToReturn},
	MessageAggregate,
};

impl From<&MessageAggregate> for MessageToReturn {
	fn from(value: &MessageAggregate) -> Self {
		Self {
			id: value.id,
			sender_id: value.sender_id,
			sender_known_as: value.sender.known_as.clone(),
			sender_photo_url: value.sender.photo_url.clone(),
			recipient_id: value.recipient_id,
			recipient_known_as: value.recipient.known_as.clone(),
			recipient_photo_url: value.recipient.photo_url.clone(),
			content: value.content.clone(),
			is_read: value.is_read,
			date_read: value.date_read,
			message_sent: value.message_sent,
		}
	}
}

impl From<MessageAggregate> for MessageToReturn {
	fn from(value: MessageAggregate) -> Self {
		(&value).into()
	}
}

// Identifier is left for the repository to assign on commit.
impl From<MessageForCreation> for Message {
	fn from(value: MessageForCreation) -> Self {
		Self {
			id: 0,
			sender_id: value.sender_id,
			recipient_id: value.recipient_id,
			content: value.content,
			is_read: false,
			date_read: None,
			message_sent: value.message_sent,
			sender_deleted: false,
			recipient_deleted: false,
		}
	}
}
