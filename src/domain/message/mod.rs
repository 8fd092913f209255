use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use self::entity::{Message, Participant};
pub mod entity;
pub mod mapper;
pub mod schemas;

/// A message together with the display data of both participants.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAggregate {
	pub(crate) message: Message,
	pub(crate) sender: Participant,
	pub(crate) recipient: Participant,
}

impl MessageAggregate {
	pub fn new(
		message: Message,
		sender: Participant,
		recipient: Participant,
	) -> Self {
		Self { message, sender, recipient }
	}

	pub fn sender(&self) -> &Participant {
		&self.sender
	}
	pub fn recipient(&self) -> &Participant {
		&self.recipient
	}
}

impl Deref for MessageAggregate {
	type Target = Message;
	fn deref(&self) -> &Self::Target {
		&self.message
	}
}
impl DerefMut for MessageAggregate {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.message
	}
}
