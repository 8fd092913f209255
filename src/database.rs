use std::mem;

use sqlx::{postgres::PgPool, PgConnection, Postgres, Transaction};

use crate::services::response::ServiceError;

/// Per-request handle on the shared pool. Writes go through a transaction opened
/// with [`DatabaseExecutor::begin`]; reads use the pool directly.
pub struct DatabaseExecutor {
	pool: PgPool,
	transaction: Option<Transaction<'static, Postgres>>,
}

impl DatabaseExecutor {
	pub fn new(pool: PgPool) -> Self {
		Self { pool, transaction: None }
	}

	pub fn transaction(&mut self) -> Result<&mut PgConnection, ServiceError> {
		match self.transaction.as_mut() {
			Some(trx) => Ok(&mut **trx),
			None => Err(ServiceError::TransactionError),
		}
	}
	pub fn connection(&self) -> &PgPool {
		&self.pool
	}

	pub(crate) async fn begin(&mut self) -> Result<(), ServiceError> {
		match self.transaction.as_mut() {
			None => {
				self.transaction = Some(self.pool.begin().await?);
				Ok(())
			}
			Some(_trx) => {
				tracing::warn!("Transaction Begun Already!");
				Err(ServiceError::TransactionError)
			}
		}
	}

	pub(crate) async fn commit(&mut self) -> Result<(), ServiceError> {
		let trx = mem::take(&mut self.transaction).ok_or(ServiceError::TransactionError)?;
		trx.commit().await.map_err(|err| {
			tracing::error!("Error occurred during commit operation : {:?}", err);
			ServiceError::DatabaseError(err)
		})
	}
	pub(crate) async fn rollback(&mut self) -> Result<(), ServiceError> {
		let trx = mem::take(&mut self.transaction).ok_or(ServiceError::TransactionError)?;
		trx.rollback().await.map_err(ServiceError::DatabaseError)
	}
}
