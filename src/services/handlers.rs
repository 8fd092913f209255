use crate::{
	adapters::repositories::TMessageRepository,
	common::{identity::RequestContext, pagination::PagedList},
	domain::message::{
		entity::Message,
		schemas::{MessageForCreation, MessageQueryParams, MessageToReturn},
		MessageAggregate,
	},
};

use super::response::ServiceError;

pub struct MessageHandler;
impl MessageHandler {
	pub async fn get_message<R: TMessageRepository>(
		context: &RequestContext,
		id: i64,
		repository: &R,
	) -> Result<MessageToReturn, ServiceError> {
		tracing::debug!(user_id = context.user_id(), id, "fetching message");
		let message = repository.get_message(id).await?.ok_or(ServiceError::EntityNotFound)?;
		Ok(message.into())
	}

	/// The page always belongs to the context's user, whatever `params.user_id` said.
	pub async fn get_messages_for_user<R: TMessageRepository>(
		context: &RequestContext,
		mut params: MessageQueryParams,
		repository: &R,
	) -> Result<PagedList<MessageToReturn>, ServiceError> {
		params.user_id = context.user_id();
		let params = params.normalized();

		let messages = repository.get_messages_for_user(&params).await?;
		Ok(messages.map(MessageToReturn::from))
	}

	pub async fn get_message_thread<R: TMessageRepository>(
		context: &RequestContext,
		recipient_id: i64,
		repository: &R,
	) -> Result<Vec<MessageToReturn>, ServiceError> {
		let thread = repository.get_message_thread(context.user_id(), recipient_id).await?;
		Ok(thread.into_iter().map(MessageToReturn::from).collect())
	}

	pub async fn create_message<R: TMessageRepository>(
		context: &RequestContext,
		mut input: MessageForCreation,
		repository: &mut R,
	) -> Result<MessageToReturn, ServiceError> {
		input.sender_id = context.user_id();

		let recipient = repository.get_user(input.recipient_id).await?.ok_or(ServiceError::RecipientNotFound)?;
		// Authorized callers are expected to exist; a dangling identity is treated as unauthenticated.
		let sender = repository.get_user(input.sender_id).await?.ok_or(ServiceError::Unauthorized)?;

		repository.add(Message::from(input));

		let saved = repository.save_all().await.map_err(|err| {
			tracing::error!("Creating the message failed on save: {}", err);
			ServiceError::SaveFailed
		})?;
		let message = saved.into_iter().next().ok_or(ServiceError::SaveFailed)?;

		tracing::info!(id = message.id, sender_id = message.sender_id, recipient_id = message.recipient_id, "message created");
		Ok(MessageAggregate::new(message, (&sender).into(), (&recipient).into()).into())
	}
}

#[cfg(test)]
mod tests {
	use chrono::{Duration, Utc};

	use super::*;
	use crate::{
		adapters::repositories::memory::{MemoryRepository, MemoryStore, SharedMemoryStore},
		common::identity::CallerIdentity,
		domain::message::entity::User,
	};

	fn context(user_id: i64) -> RequestContext {
		RequestContext::authorize(CallerIdentity(user_id), user_id).unwrap()
	}

	fn seeded() -> SharedMemoryStore {
		let mut store = MemoryStore::default();
		for (id, known_as) in [(5, "Lola"), (9, "Kim"), (12, "Sam")] {
			store.insert_user(User {
				id,
				username: known_as.to_lowercase(),
				known_as: known_as.into(),
				photo_url: Some(format!("https://photos/{id}.jpg")),
				last_active: Utc::now(),
			});
		}
		store.shared()
	}

	fn creation(
		recipient_id: i64,
		content: &str,
	) -> MessageForCreation {
		MessageForCreation {
			sender_id: 0,
			recipient_id,
			content: content.into(),
			message_sent: Utc::now(),
		}
	}

	#[tokio::test]
	async fn test_get_message_not_found() {
		let repository = MemoryRepository::new(seeded());
		let result = MessageHandler::get_message(&context(5), 42, &repository).await;
		assert!(matches!(result, Err(ServiceError::EntityNotFound)));
	}

	#[tokio::test]
	async fn test_get_message_returns_stored_record() {
		let store = seeded();
		let id = store.write().await.insert_message(Message {
			sender_id: 9,
			recipient_id: 5,
			content: "hello there".into(),
			message_sent: Utc::now(),
			..Default::default()
		});
		let repository = MemoryRepository::new(store);

		let message = MessageHandler::get_message(&context(5), id, &repository).await.unwrap();
		assert_eq!(message.id, id);
		assert_eq!((message.sender_id, message.recipient_id), (9, 5));
		assert_eq!(message.sender_known_as, "Kim");
		assert_eq!(message.content, "hello there");
	}

	#[tokio::test]
	async fn test_messages_for_user_overrides_client_user_id() {
		let store = seeded();
		{
			let mut store = store.write().await;
			for minutes_ago in 0..4 {
				store.insert_message(Message {
					sender_id: 9,
					recipient_id: 5,
					content: format!("to lola {minutes_ago}"),
					message_sent: Utc::now() - Duration::minutes(minutes_ago),
					..Default::default()
				});
			}
			store.insert_message(Message {
				sender_id: 5,
				recipient_id: 12,
				content: "to sam".into(),
				message_sent: Utc::now(),
				..Default::default()
			});
		}
		let repository = MemoryRepository::new(store);

		let params = MessageQueryParams {
			user_id: 12,
			page_size: 3,
			..Default::default()
		};
		let page = MessageHandler::get_messages_for_user(&context(5), params, &repository).await.unwrap();

		assert!(page.items.iter().all(|message| message.recipient_id == 5));
		assert_eq!(page.items.len(), 3);
		assert_eq!((page.total_count, page.total_pages), (4, 2));
		assert_eq!(page.items[0].content, "to lola 0");
	}

	#[tokio::test]
	async fn test_thread_is_both_directions() {
		let store = seeded();
		{
			let mut store = store.write().await;
			for (sender_id, recipient_id) in [(5, 9), (9, 5), (12, 5), (5, 12)] {
				store.insert_message(Message {
					sender_id,
					recipient_id,
					content: format!("{sender_id}:{recipient_id}"),
					message_sent: Utc::now(),
					..Default::default()
				});
			}
		}
		let repository = MemoryRepository::new(store);

		let thread = MessageHandler::get_message_thread(&context(5), 9, &repository).await.unwrap();
		assert_eq!(thread.len(), 2);
		assert!(thread.iter().all(|message| [5, 9].contains(&message.sender_id) && [5, 9].contains(&message.recipient_id)));
	}

	#[tokio::test]
	async fn test_create_message_uses_caller_as_sender() {
		let store = seeded();
		let mut repository = MemoryRepository::new(store.clone());

		let mut input = creation(9, "hi");
		input.sender_id = 12;
		let created = MessageHandler::create_message(&context(5), input, &mut repository).await.unwrap();

		assert_eq!((created.sender_id, created.recipient_id), (5, 9));
		assert_eq!(created.content, "hi");
		assert_eq!(created.sender_known_as, "Lola");
		assert_eq!(created.recipient_known_as, "Kim");

		let store = store.read().await;
		assert_eq!(store.messages().len(), 1);
		assert_eq!(store.messages()[0].id, created.id);
		assert_eq!(store.messages()[0].sender_id, 5);
	}

	#[tokio::test]
	async fn test_create_message_twice_yields_distinct_ids() {
		let store = seeded();

		let mut repository = MemoryRepository::new(store.clone());
		let first = MessageHandler::create_message(&context(5), creation(9, "hi"), &mut repository).await.unwrap();
		let mut repository = MemoryRepository::new(store.clone());
		let second = MessageHandler::create_message(&context(5), creation(9, "hi"), &mut repository).await.unwrap();

		assert_ne!(first.id, second.id);
		assert_eq!(store.read().await.messages().len(), 2);
	}

	#[tokio::test]
	async fn test_create_message_unknown_recipient_stages_nothing() {
		let store = seeded();
		let mut repository = MemoryRepository::new(store.clone());

		let result = MessageHandler::create_message(&context(5), creation(404, "anyone?"), &mut repository).await;
		assert!(matches!(result, Err(ServiceError::RecipientNotFound)));

		// A later commit on the same unit of work has nothing to write
		assert!(repository.save_all().await.unwrap().is_empty());
		assert!(store.read().await.messages().is_empty());
	}

	#[tokio::test]
	async fn test_create_message_commit_failure_is_save_failed() {
		let store = seeded();
		store.write().await.reject_commits(true);
		let mut repository = MemoryRepository::new(store.clone());

		let result = MessageHandler::create_message(&context(5), creation(9, "hi"), &mut repository).await;
		assert!(matches!(result, Err(ServiceError::SaveFailed)));
		assert!(store.read().await.messages().is_empty());
	}
}
