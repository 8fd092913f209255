use std::mem;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::{
	common::pagination::{PageWindow, PagedList},
	database::DatabaseExecutor,
	domain::message::{
		entity::{Message, Participant, User},
		schemas::{MessageContainer, MessageQueryParams},
		MessageAggregate,
	},
	services::response::ServiceError,
};

use super::TMessageRepository;

const SELECT_MESSAGES: &str = r#"
SELECT m.id, m.sender_id, m.recipient_id, m.content, m.is_read, m.date_read, m.message_sent,
       m.sender_deleted, m.recipient_deleted,
       s.known_as AS sender_known_as,
       (SELECT p.url FROM photos p WHERE p.user_id = s.id AND p.is_main LIMIT 1) AS sender_photo_url,
       r.known_as AS recipient_known_as,
       (SELECT p.url FROM photos p WHERE p.user_id = r.id AND p.is_main LIMIT 1) AS recipient_photo_url
FROM messages m
JOIN users s ON s.id = m.sender_id
JOIN users r ON r.id = m.recipient_id
"#;

#[derive(sqlx::FromRow)]
struct MessageRow {
	id: i64,
	sender_id: i64,
	recipient_id: i64,
	content: String,
	is_read: bool,
	date_read: Option<DateTime<Utc>>,
	message_sent: DateTime<Utc>,
	sender_deleted: bool,
	recipient_deleted: bool,
	sender_known_as: String,
	sender_photo_url: Option<String>,
	recipient_known_as: String,
	recipient_photo_url: Option<String>,
}

impl From<MessageRow> for MessageAggregate {
	fn from(row: MessageRow) -> Self {
		MessageAggregate::new(
			Message {
				id: row.id,
				sender_id: row.sender_id,
				recipient_id: row.recipient_id,
				content: row.content,
				is_read: row.is_read,
				date_read: row.date_read,
				message_sent: row.message_sent,
				sender_deleted: row.sender_deleted,
				recipient_deleted: row.recipient_deleted,
			},
			Participant {
				id: row.sender_id,
				known_as: row.sender_known_as,
				photo_url: row.sender_photo_url,
			},
			Participant {
				id: row.recipient_id,
				known_as: row.recipient_known_as,
				photo_url: row.recipient_photo_url,
			},
		)
	}
}

#[derive(sqlx::FromRow)]
struct UserRow {
	id: i64,
	username: String,
	known_as: String,
	photo_url: Option<String>,
	last_active: DateTime<Utc>,
}

impl From<UserRow> for User {
	fn from(row: UserRow) -> Self {
		User {
			id: row.id,
			username: row.username,
			known_as: row.known_as,
			photo_url: row.photo_url,
			last_active: row.last_active,
		}
	}
}

/// `$1` is always the user the container belongs to.
fn container_predicate(container: MessageContainer) -> &'static str {
	match container {
		MessageContainer::Inbox => "m.recipient_id = $1 AND m.recipient_deleted = FALSE",
		MessageContainer::Outbox => "m.sender_id = $1 AND m.sender_deleted = FALSE",
		MessageContainer::Unread => "m.recipient_id = $1 AND m.recipient_deleted = FALSE AND m.is_read = FALSE",
	}
}

async fn insert_message(
	conn: &mut PgConnection,
	message: &Message,
) -> Result<i64, sqlx::Error> {
	sqlx::query_scalar::<_, i64>(
		r#"
		INSERT INTO messages (sender_id, recipient_id, content, is_read, date_read, message_sent, sender_deleted, recipient_deleted)
		VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
		RETURNING id
		"#,
	)
	.bind(message.sender_id)
	.bind(message.recipient_id)
	.bind(&message.content)
	.bind(message.is_read)
	.bind(message.date_read)
	.bind(message.message_sent)
	.bind(message.sender_deleted)
	.bind(message.recipient_deleted)
	.fetch_one(conn)
	.await
}

/// Postgres-backed repository over the `users`, `photos` and `messages` tables.
pub struct MessageRepository {
	executor: DatabaseExecutor,
	staged: Vec<Message>,
}

#[async_trait]
impl TMessageRepository for MessageRepository {
	type Executor = PgPool;

	fn new(executor: PgPool) -> Self {
		Self {
			executor: DatabaseExecutor::new(executor),
			staged: Default::default(),
		}
	}

	async fn get_message(
		&self,
		id: i64,
	) -> Result<Option<MessageAggregate>, ServiceError> {
		let sql = format!("{SELECT_MESSAGES} WHERE m.id = $1");
		let row = sqlx::query_as::<_, MessageRow>(&sql).bind(id).fetch_optional(self.executor.connection()).await?;
		Ok(row.map(Into::into))
	}

	async fn get_messages_for_user(
		&self,
		params: &MessageQueryParams,
	) -> Result<PagedList<MessageAggregate>, ServiceError> {
		let predicate = container_predicate(params.message_container);

		let count_sql = format!("SELECT COUNT(*) FROM messages m WHERE {predicate}");
		let total_count = sqlx::query_scalar::<_, i64>(&count_sql)
			.bind(params.user_id)
			.fetch_one(self.executor.connection())
			.await?
			.max(0) as u64;

		let window = PageWindow::new(total_count, params.page_number, params.page_size);
		let page_sql = format!("{SELECT_MESSAGES} WHERE {predicate} ORDER BY m.message_sent DESC, m.id DESC LIMIT $2 OFFSET $3");
		let rows = sqlx::query_as::<_, MessageRow>(&page_sql)
			.bind(params.user_id)
			.bind(window.page_size as i64)
			.bind(window.offset() as i64)
			.fetch_all(self.executor.connection())
			.await?;

		Ok(PagedList::new(rows.into_iter().map(Into::into).collect(), total_count, window))
	}

	async fn get_message_thread(
		&self,
		user_id: i64,
		recipient_id: i64,
	) -> Result<Vec<MessageAggregate>, ServiceError> {
		let sql = format!(
			"{SELECT_MESSAGES} WHERE (m.recipient_id = $1 AND m.sender_id = $2 AND m.recipient_deleted = FALSE) \
			 OR (m.recipient_id = $2 AND m.sender_id = $1 AND m.sender_deleted = FALSE) \
			 ORDER BY m.message_sent DESC, m.id DESC"
		);
		let rows = sqlx::query_as::<_, MessageRow>(&sql)
			.bind(user_id)
			.bind(recipient_id)
			.fetch_all(self.executor.connection())
			.await?;
		Ok(rows.into_iter().map(Into::into).collect())
	}

	async fn get_user(
		&self,
		id: i64,
	) -> Result<Option<User>, ServiceError> {
		let row = sqlx::query_as::<_, UserRow>(
			r#"
			SELECT u.id, u.username, u.known_as, u.last_active,
			       (SELECT p.url FROM photos p WHERE p.user_id = u.id AND p.is_main LIMIT 1) AS photo_url
			FROM users u
			WHERE u.id = $1
			"#,
		)
		.bind(id)
		.fetch_optional(self.executor.connection())
		.await?;
		Ok(row.map(Into::into))
	}

	fn add(
		&mut self,
		message: Message,
	) {
		self.staged.push(message);
	}

	async fn save_all(&mut self) -> Result<Vec<Message>, ServiceError> {
		let staged = mem::take(&mut self.staged);
		if staged.is_empty() {
			return Ok(vec![]);
		}

		self.executor.begin().await?;
		let mut saved = Vec::with_capacity(staged.len());
		for mut message in staged {
			match insert_message(self.executor.transaction()?, &message).await {
				Ok(id) => {
					message.id = id;
					saved.push(message);
				}
				Err(err) => {
					self.executor.rollback().await?;
					return Err(err.into());
				}
			}
		}
		self.executor.commit().await?;
		Ok(saved)
	}

	async fn update_last_active(
		&self,
		user_id: i64,
		at: DateTime<Utc>,
	) -> Result<(), ServiceError> {
		sqlx::query("UPDATE users SET last_active = $2 WHERE id = $1")
			.bind(user_id)
			.bind(at)
			.execute(self.executor.connection())
			.await?;
		Ok(())
	}
}
