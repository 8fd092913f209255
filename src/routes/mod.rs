mod messages;

use axum::{middleware, routing::get, Router};

use crate::{
	adapters::repositories::TMessageRepository,
	common::middleware_identity::{authorize_path_user, set_caller_identity},
};

/// Shared by every request; each one builds its own repository from it.
pub struct AppState<R: TMessageRepository> {
	executor: R::Executor,
}

impl<R: TMessageRepository> Clone for AppState<R> {
	fn clone(&self) -> Self {
		Self {
			executor: self.executor.clone(),
		}
	}
}

impl<R: TMessageRepository> AppState<R> {
	pub fn new(executor: R::Executor) -> Self {
		Self { executor }
	}

	pub fn repository(&self) -> R {
		R::new(self.executor.clone())
	}
}

pub fn create_routes<R: TMessageRepository>(state: AppState<R>) -> Router {
	Router::new()
		.route(
			"/api/users/:user_id/messages",
			get(messages::get_messages_for_user::<R>).post(messages::create_message::<R>),
		)
		.route("/api/users/:user_id/messages/:id", get(messages::get_message::<R>))
		.route("/api/users/:user_id/messages/thread/:recipient_id", get(messages::get_message_thread::<R>))
		.route_layer(middleware::from_fn_with_state(state.clone(), authorize_path_user::<R, _>))
		.layer(middleware::from_fn(set_caller_identity))
		.with_state(state)
}
