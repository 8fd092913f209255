use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
	/// Caller identity is missing or does not own the requested resource path.
	#[error("Unauthorized")]
	Unauthorized,

	#[error("EntityNotFound")]
	EntityNotFound,

	/// Referenced recipient does not exist. Returned before anything is staged.
	#[error("Could not find user")]
	RecipientNotFound,

	#[error("BadRequest: {0}")]
	BadRequest(String),

	/// The repository refused an already validated write.
	#[error("Creating the message failed on save")]
	SaveFailed,

	#[error("TransactionError")]
	TransactionError,

	#[error("DatabaseError: {0}")]
	DatabaseError(#[from] sqlx::Error),

	#[error("ConfigError: {0}")]
	ConfigError(String),
}

impl ServiceError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
			ServiceError::EntityNotFound => StatusCode::NOT_FOUND,
			ServiceError::RecipientNotFound | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServiceError::SaveFailed | ServiceError::TransactionError | ServiceError::DatabaseError(_) | ServiceError::ConfigError(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
			// Don't leak database details to the client
			return (status, String::from("Internal server error")).into_response();
		}
		match self {
			ServiceError::EntityNotFound => status.into_response(),
			other => (status, other.to_string()).into_response(),
		}
	}
}
