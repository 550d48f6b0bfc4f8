//! Expense ledger.
//!
//! Expenses are written through compensable operations; balances are a
//! projection recomputed from `spendings` on every query and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Currency;

pub use controller::LedgerController;
pub use operations::{AddExpense, RemoveExpense};
pub use repository::LedgerRepository;

mod controller;
mod operations;
mod repository;

/// Net of an actor's own shares across every expense shared with
/// `counterparty`, one total per currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub counterparty: String,
    pub currencies: BTreeMap<Currency, i64>,
}

impl Balance {
    pub fn new(counterparty: impl Into<String>) -> Self {
        Self {
            counterparty: counterparty.into(),
            currencies: BTreeMap::new(),
        }
    }

    /// Total in `currency`, zero when nothing was recorded in it.
    pub fn in_currency(&self, currency: &Currency) -> i64 {
        self.currencies.get(currency).copied().unwrap_or(0)
    }
}
