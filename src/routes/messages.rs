use axum::{
	extract::{Path, Query, State},
	http::{header, HeaderMap, HeaderName, StatusCode},
	Extension, Json,
};

use crate::{
	adapters::repositories::TMessageRepository,
	common::{identity::RequestContext, pagination::add_pagination},
	domain::message::schemas::{MessageForCreation, MessageQueryParams, MessageToReturn},
	services::{handlers::MessageHandler, response::ServiceError},
};

use super::AppState;

pub async fn get_message<R: TMessageRepository>(
	State(state): State<AppState<R>>,
	Extension(context): Extension<RequestContext>,
	Path((_user_id, id)): Path<(i64, i64)>,
) -> Result<Json<MessageToReturn>, ServiceError> {
	let repository = state.repository();
	MessageHandler::get_message(&context, id, &repository).await.map(Json)
}

pub async fn get_messages_for_user<R: TMessageRepository>(
	State(state): State<AppState<R>>,
	Extension(context): Extension<RequestContext>,
	Query(params): Query<MessageQueryParams>,
) -> Result<(HeaderMap, Json<Vec<MessageToReturn>>), ServiceError> {
	let repository = state.repository();
	let page = MessageHandler::get_messages_for_user(&context, params, &repository).await?;

	let mut headers = HeaderMap::new();
	add_pagination(&mut headers, page.header());
	Ok((headers, Json(page.items)))
}

pub async fn get_message_thread<R: TMessageRepository>(
	State(state): State<AppState<R>>,
	Extension(context): Extension<RequestContext>,
	Path((_user_id, recipient_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<MessageToReturn>>, ServiceError> {
	let repository = state.repository();
	MessageHandler::get_message_thread(&context, recipient_id, &repository).await.map(Json)
}

pub async fn create_message<R: TMessageRepository>(
	State(state): State<AppState<R>>,
	Extension(context): Extension<RequestContext>,
	Json(input): Json<MessageForCreation>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<MessageToReturn>), ServiceError> {
	let mut repository = state.repository();
	let message = MessageHandler::create_message(&context, input, &mut repository).await?;

	let location = format!("/api/users/{}/messages/{}", context.user_id(), message.id);
	Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(message)))
}
