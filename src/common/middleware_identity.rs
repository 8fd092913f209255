use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use chrono::Utc;

use crate::adapters::repositories::TMessageRepository;
use crate::routes::AppState;
use crate::services::response::ServiceError;

use super::identity::{CallerIdentity, RequestContext};

/// Header the authentication gateway forwards the verified caller id in.
pub const USER_ID_HEADER: &str = "x-user-id";

pub async fn set_caller_identity<B>(
	mut request: Request<B>,
	next: Next<B>,
) -> Result<Response, ServiceError> {
	let headers = request.headers();

	let caller = headers.get(USER_ID_HEADER).ok_or(ServiceError::Unauthorized)?;

	let caller = caller
		.to_str()
		.ok()
		.and_then(|value| value.trim().parse::<i64>().ok())
		.ok_or(ServiceError::Unauthorized)?;

	let extensions = request.extensions_mut();
	extensions.insert(CallerIdentity(caller));

	Ok(next.run(request).await)
}

/// Rejects the request unless the caller owns the `user_id` path segment, then
/// stamps the caller's last activity once the handler has answered.
pub async fn authorize_path_user<R: TMessageRepository, B>(
	State(state): State<AppState<R>>,
	Extension(caller): Extension<CallerIdentity>,
	Path(params): Path<HashMap<String, String>>,
	mut request: Request<B>,
	next: Next<B>,
) -> Result<Response, ServiceError> {
	let path_user_id = params
		.get("user_id")
		.and_then(|value| value.parse::<i64>().ok())
		.ok_or_else(|| ServiceError::BadRequest("userId must be a number".into()))?;

	let context = RequestContext::authorize(caller, path_user_id).map_err(|err| {
		tracing::warn!(caller = caller.0, path_user_id, "caller does not own the requested user path");
		err
	})?;
	request.extensions_mut().insert(context);

	let response = next.run(request).await;

	if let Err(err) = state.repository().update_last_active(context.user_id(), Utc::now()).await {
		tracing::warn!(user_id = context.user_id(), "failed to record user activity: {}", err);
	}
	Ok(response)
}
