//! Transaction mode descriptors.
//!
//! A [`TransactionMode`] describes how a transaction should be opened.
//! [`SERIAL_MODE`] is the mode used for writes that must not interleave.

use crate::error::BootstrapResult;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// PostgreSQL transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Immutable description of a transaction's isolation and access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionMode {
    pub isolation: IsolationLevel,
    pub read_only: bool,
    pub deferrable: bool,
}

/// Serializable, read-write, not deferrable.
pub const SERIAL_MODE: TransactionMode = TransactionMode {
    isolation: IsolationLevel::Serializable,
    read_only: false,
    deferrable: false,
};

impl TransactionMode {
    /// The `SET TRANSACTION` statement that applies this mode.
    ///
    /// Must run as the first statement of a transaction.
    pub fn set_transaction_sql(&self) -> String {
        format!(
            "SET TRANSACTION ISOLATION LEVEL {} {} {}",
            self.isolation.as_sql(),
            if self.read_only { "READ ONLY" } else { "READ WRITE" },
            if self.deferrable {
                "DEFERRABLE"
            } else {
                "NOT DEFERRABLE"
            },
        )
    }

    /// Begin a transaction on `pool` with this mode applied.
    pub async fn begin(&self, pool: &PgPool) -> BootstrapResult<Transaction<'static, Postgres>> {
        let mut tx = pool.begin().await?;
        sqlx::query(&self.set_transaction_sql())
            .execute(&mut *tx)
            .await?;
        debug!(isolation = %self.isolation, read_only = self.read_only, "Transaction started");
        Ok(tx)
    }
}
