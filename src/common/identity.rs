use crate::services::response::ServiceError;

/// User id asserted by the upstream authentication layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallerIdentity(pub i64);

/// Proof that the caller owns the `{userId}` path segment of the current request.
///
/// Only [`RequestContext::authorize`] builds one, so every service call taking a
/// context has passed the ownership check first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestContext {
	user_id: i64,
}

impl RequestContext {
	pub fn authorize(
		caller: CallerIdentity,
		path_user_id: i64,
	) -> Result<Self, ServiceError> {
		if caller.0 != path_user_id {
			return Err(ServiceError::Unauthorized);
		}
		Ok(Self { user_id: path_user_id })
	}

	pub fn user_id(&self) -> i64 {
		self.user_id
	}
}
