pub mod memory;
pub mod message_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
	common::pagination::PagedList,
	domain::message::{
		entity::{Message, User},
		schemas::MessageQueryParams,
		MessageAggregate,
	},
	services::response::ServiceError,
};

/// Unit of work over messages and the users they reference.
///
/// One repository is built per request from a shared `Executor`. Writes are staged
/// with [`TMessageRepository::add`] and only reach storage on
/// [`TMessageRepository::save_all`].
#[async_trait]
pub trait TMessageRepository: Send + Sync + Sized + 'static {
	type Executor: Clone + Send + Sync + 'static;

	fn new(executor: Self::Executor) -> Self;

	async fn get_message(
		&self,
		id: i64,
	) -> Result<Option<MessageAggregate>, ServiceError>;

	/// Page of the messages in `params.message_container` for `params.user_id`, newest first.
	async fn get_messages_for_user(
		&self,
		params: &MessageQueryParams,
	) -> Result<PagedList<MessageAggregate>, ServiceError>;

	/// Messages exchanged between the two users, newest first, minus the ones
	/// `user_id` has deleted on their side.
	async fn get_message_thread(
		&self,
		user_id: i64,
		recipient_id: i64,
	) -> Result<Vec<MessageAggregate>, ServiceError>;

	async fn get_user(
		&self,
		id: i64,
	) -> Result<Option<User>, ServiceError>;

	fn add(
		&mut self,
		message: Message,
	);

	/// Commits everything staged, returning the written messages with their
	/// assigned ids. An empty result means nothing was written.
	async fn save_all(&mut self) -> Result<Vec<Message>, ServiceError>;

	async fn update_last_active(
		&self,
		user_id: i64,
		at: DateTime<Utc>,
	) -> Result<(), ServiceError>;
}
