use std::{collections::HashMap, mem, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
	common::pagination::{PageWindow, PagedList},
	domain::message::{
		entity::{Message, User},
		schemas::{MessageContainer, MessageQueryParams},
		MessageAggregate,
	},
	services::response::ServiceError,
};

use super::TMessageRepository;

/// Process-local storage behind [`MemoryRepository`].
#[derive(Debug, Default)]
pub struct MemoryStore {
	users: HashMap<i64, User>,
	messages: Vec<Message>,
	last_id: i64,
	operations: usize,
	reject_commits: bool,
}

pub type SharedMemoryStore = Arc<RwLock<MemoryStore>>;

impl MemoryStore {
	pub fn shared(self) -> SharedMemoryStore {
		Arc::new(RwLock::new(self))
	}

	pub fn insert_user(
		&mut self,
		user: User,
	) {
		self.users.insert(user.id, user);
	}

	/// Stores `message` under a fresh id and returns that id.
	pub fn insert_message(
		&mut self,
		mut message: Message,
	) -> i64 {
		self.last_id += 1;
		message.id = self.last_id;
		self.messages.push(message);
		self.last_id
	}

	pub fn user(
		&self,
		id: i64,
	) -> Option<&User> {
		self.users.get(&id)
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	/// Number of repository calls served so far.
	pub fn operations(&self) -> usize {
		self.operations
	}

	/// Makes every following commit fail, as a database refusing the write would.
	pub fn reject_commits(
		&mut self,
		reject: bool,
	) {
		self.reject_commits = reject;
	}

	// Messages whose sender or recipient is gone are skipped, same as the SQL join.
	fn aggregate(
		&self,
		message: &Message,
	) -> Option<MessageAggregate> {
		let sender = self.users.get(&message.sender_id)?;
		let recipient = self.users.get(&message.recipient_id)?;
		Some(MessageAggregate::new(message.clone(), sender.into(), recipient.into()))
	}

	fn newest_first<'a>(
		&'a self,
		filter: impl Fn(&Message) -> bool,
	) -> Vec<MessageAggregate> {
		let mut found: Vec<&'a Message> = self.messages.iter().filter(|&message| filter(message)).collect();
		found.sort_by(|a, b| b.message_sent.cmp(&a.message_sent).then(b.id.cmp(&a.id)));
		found.into_iter().filter_map(|message| self.aggregate(message)).collect()
	}
}

fn in_container(
	message: &Message,
	user_id: i64,
	container: MessageContainer,
) -> bool {
	match container {
		MessageContainer::Inbox => message.recipient_id == user_id && !message.recipient_deleted,
		MessageContainer::Outbox => message.sender_id == user_id && !message.sender_deleted,
		MessageContainer::Unread => message.recipient_id == user_id && !message.recipient_deleted && !message.is_read,
	}
}

pub struct MemoryRepository {
	store: SharedMemoryStore,
	staged: Vec<Message>,
}

#[async_trait]
impl TMessageRepository for MemoryRepository {
	type Executor = SharedMemoryStore;

	fn new(executor: SharedMemoryStore) -> Self {
		Self {
			store: executor,
			staged: Default::default(),
		}
	}

	async fn get_message(
		&self,
		id: i64,
	) -> Result<Option<MessageAggregate>, ServiceError> {
		let mut store = self.store.write().await;
		store.operations += 1;
		Ok(store.messages.iter().find(|message| message.id == id).and_then(|message| store.aggregate(message)))
	}

	async fn get_messages_for_user(
		&self,
		params: &MessageQueryParams,
	) -> Result<PagedList<MessageAggregate>, ServiceError> {
		let mut store = self.store.write().await;
		store.operations += 1;

		let all = store.newest_first(|message| in_container(message, params.user_id, params.message_container));
		let total_count = all.len() as u64;
		let window = PageWindow::new(total_count, params.page_number, params.page_size);
		let items = all.into_iter().skip(window.offset() as usize).take(window.page_size as usize).collect();
		Ok(PagedList::new(items, total_count, window))
	}

	async fn get_message_thread(
		&self,
		user_id: i64,
		recipient_id: i64,
	) -> Result<Vec<MessageAggregate>, ServiceError> {
		let mut store = self.store.write().await;
		store.operations += 1;
		Ok(store.newest_first(|message| {
			(message.recipient_id == user_id && message.sender_id == recipient_id && !message.recipient_deleted)
				|| (message.recipient_id == recipient_id && message.sender_id == user_id && !message.sender_deleted)
		}))
	}

	async fn get_user(
		&self,
		id: i64,
	) -> Result<Option<User>, ServiceError> {
		let mut store = self.store.write().await;
		store.operations += 1;
		Ok(store.users.get(&id).cloned())
	}

	fn add(
		&mut self,
		message: Message,
	) {
		self.staged.push(message);
	}

	async fn save_all(&mut self) -> Result<Vec<Message>, ServiceError> {
		let staged = mem::take(&mut self.staged);
		let mut store = self.store.write().await;
		store.operations += 1;
		if store.reject_commits {
			return Err(ServiceError::TransactionError);
		}

		Ok(staged
			.into_iter()
			.map(|mut message| {
				message.id = store.insert_message(message.clone());
				message
			})
			.collect())
	}

	async fn update_last_active(
		&self,
		user_id: i64,
		at: DateTime<Utc>,
	) -> Result<(), ServiceError> {
		let mut store = self.store.write().await;
		store.operations += 1;
		if let Some(user) = store.users.get_mut(&user_id) {
			user.last_active = at;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use chrono::Duration;

	use super::*;

	fn user(id: i64) -> User {
		User {
			id,
			username: format!("user{id}"),
			known_as: format!("User {id}"),
			..Default::default()
		}
	}

	fn message(
		sender_id: i64,
		recipient_id: i64,
		minutes_ago: i64,
	) -> Message {
		Message {
			sender_id,
			recipient_id,
			content: format!("{sender_id}->{recipient_id} {minutes_ago}"),
			message_sent: Utc::now() - Duration::minutes(minutes_ago),
			..Default::default()
		}
	}

	fn store() -> MemoryStore {
		let mut store = MemoryStore::default();
		for id in [1, 2, 3] {
			store.insert_user(user(id));
		}
		store
	}

	#[tokio::test]
	async fn test_containers_filter_by_side_and_state() {
		let mut store = store();
		store.insert_message(message(2, 1, 30));
		store.insert_message(Message {
			is_read: true,
			..message(3, 1, 20)
		});
		store.insert_message(Message {
			recipient_deleted: true,
			..message(2, 1, 10)
		});
		store.insert_message(message(1, 2, 5));
		let repository = MemoryRepository::new(store.shared());

		let page = |container| MessageQueryParams {
			user_id: 1,
			message_container: container,
			..Default::default()
		};

		let inbox = repository.get_messages_for_user(&page(MessageContainer::Inbox)).await.unwrap();
		assert_eq!(inbox.items.iter().map(|m| m.sender_id).collect::<Vec<_>>(), vec![3, 2]);

		let unread = repository.get_messages_for_user(&page(MessageContainer::Unread)).await.unwrap();
		assert_eq!(unread.total_count, 1);
		assert_eq!(unread.items[0].sender_id, 2);

		let outbox = repository.get_messages_for_user(&page(MessageContainer::Outbox)).await.unwrap();
		assert_eq!(outbox.items.len(), 1);
		assert_eq!(outbox.items[0].recipient_id, 2);
	}

	#[tokio::test]
	async fn test_paging_respects_window() {
		let mut store = store();
		for minutes_ago in 0..7 {
			store.insert_message(message(2, 1, minutes_ago));
		}
		let repository = MemoryRepository::new(store.shared());

		let page = repository
			.get_messages_for_user(&MessageQueryParams {
				user_id: 1,
				page_number: 3,
				page_size: 3,
				..Default::default()
			})
			.await
			.unwrap();

		assert_eq!((page.total_count, page.total_pages, page.current_page), (7, 3, 3));
		assert_eq!(page.items.len(), 1);
		assert_eq!(page.items[0].content, "2->1 6");
	}

	#[tokio::test]
	async fn test_thread_hides_own_deleted_side() {
		let mut store = store();
		store.insert_message(message(1, 2, 3));
		store.insert_message(Message {
			sender_deleted: true,
			..message(1, 2, 2)
		});
		store.insert_message(message(2, 1, 1));
		store.insert_message(message(3, 1, 0));
		let repository = MemoryRepository::new(store.shared());

		let thread = repository.get_message_thread(1, 2).await.unwrap();
		assert_eq!(thread.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(), vec!["2->1 1", "1->2 3"]);

		// The other side still sees the message user 1 deleted.
		let thread = repository.get_message_thread(2, 1).await.unwrap();
		assert_eq!(thread.len(), 3);
	}

	#[tokio::test]
	async fn test_save_all_assigns_distinct_ids() {
		let shared = store().shared();
		let mut repository = MemoryRepository::new(shared.clone());
		repository.add(message(1, 2, 0));
		repository.add(message(1, 3, 0));

		let saved = repository.save_all().await.unwrap();
		assert_eq!(saved.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
		assert_eq!(shared.read().await.messages().len(), 2);

		// Nothing left staged
		assert!(repository.save_all().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_rejected_commit_writes_nothing() {
		let shared = store().shared();
		shared.write().await.reject_commits(true);
		let mut repository = MemoryRepository::new(shared.clone());
		repository.add(message(1, 2, 0));

		assert!(repository.save_all().await.is_err());
		assert!(shared.read().await.messages().is_empty());
	}
}
