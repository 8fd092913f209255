pub mod identity;
pub mod middleware_identity;
pub mod pagination;
