use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod allocations;
mod balances;
mod budgets;
mod goals;
mod months;
mod schedule;
mod transactions;

pub use months::StartMonthOutcome;
pub use transactions::{TransactionListFilter, TransactionPage};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// An early `?` inside the block returns before the commit; dropping the
/// uncommitted `DatabaseTransaction` rolls it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
