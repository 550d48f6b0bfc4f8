//! Relationship and ledger consistency core.
//!
//! - [`FriendController`] / [`FriendRepository`]: friendships derived from
//!   directed friend-request edges.
//! - [`LedgerController`] / [`LedgerRepository`]: multi-party expenses and the
//!   balances projected from them.
//! - [`Compensable`] / [`Journal`]: reversible mutations standing in for a
//!   transaction across several store calls.

use sea_orm::DatabaseConnection;

pub use compensable::{Compensable, Journal};
pub use currency::Currency;
pub use deals::Expense;
pub use error::{EngineError, ErrorCode};
pub use ledger::{AddExpense, Balance, LedgerController, LedgerRepository, RemoveExpense};
pub use relationships::{AddEdge, FriendController, FriendRepository, FriendStatus, RemoveEdge};
pub use spendings::ShareOfExpense;

mod compensable;
mod currency;
mod deals;
mod error;
mod friend_requests;
mod ledger;
mod relationships;
mod spendings;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($db:expr, |$tx:ident| $body:expr) => {{
        let $tx = $db.begin().await?;
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

#[derive(Clone, Debug)]
pub struct Engine {
    friends: FriendController,
    ledger: LedgerController,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn friends(&self) -> &FriendController {
        &self.friends
    }

    pub fn ledger(&self) -> &LedgerController {
        &self.ledger
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
        self.database.ping().await?;
        let friends = FriendController::new(FriendRepository::new(self.database.clone()));
        let ledger = LedgerController::new(LedgerRepository::new(self.database));
        Ok(Engine { friends, ledger })
    }
}
