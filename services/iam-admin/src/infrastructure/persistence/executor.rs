//! 统一的查询执行器
//!
//! 同一套仓储实现既可以跑在连接池上，也可以跑在共享事务上。

use std::sync::Arc;

use admin_errors::{AppError, AppResult};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use super::error_mapper::map_sqlx_error;

/// Shared transaction type
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

fn transaction_consumed() -> AppError {
    AppError::internal("Transaction consumed")
}

#[derive(Clone)]
pub enum PgExecutor {
    Pool(PgPool),
    Tx(SharedTx),
}

impl PgExecutor {
    /// 执行写语句，返回影响行数
    pub async fn execute<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> AppResult<u64> {
        let result = match self {
            Self::Pool(pool) => query.execute(pool).await,
            Self::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(transaction_consumed)?;
                query.execute(&mut **conn).await
            }
        };
        result.map(|r| r.rows_affected()).map_err(map_sqlx_error)
    }

    pub async fn fetch_all<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> AppResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let result = match self {
            Self::Pool(pool) => query.fetch_all(pool).await,
            Self::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(transaction_consumed)?;
                query.fetch_all(&mut **conn).await
            }
        };
        result.map_err(map_sqlx_error)
    }

    pub async fn fetch_optional<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> AppResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let result = match self {
            Self::Pool(pool) => query.fetch_optional(pool).await,
            Self::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(transaction_consumed)?;
                query.fetch_optional(&mut **conn).await
            }
        };
        result.map_err(map_sqlx_error)
    }

    pub async fn fetch_one<'q, T>(&self, query: QueryAs<'q, Postgres, T, PgArguments>) -> AppResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let result = match self {
            Self::Pool(pool) => query.fetch_one(pool).await,
            Self::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(transaction_consumed)?;
                query.fetch_one(&mut **conn).await
            }
        };
        result.map_err(map_sqlx_error)
    }
}
