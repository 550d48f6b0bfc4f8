//! Expenses.
//!
//! An [`Expense`] is stored as one `deals` header row plus one `spendings` row
//! per [`ShareOfExpense`](crate::ShareOfExpense), correlated by the expense id.
//!
//! Amounts are signed integer **minor units** (e.g. cents for EUR). The engine
//! does not require shares to add up to `total_cost`; use
//! [`Expense::is_balanced`] to check it explicitly.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ShareOfExpense, spendings, util::model_currency};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Assigned by the store on insert; ignored when adding.
    pub id: Option<Uuid>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub details: String,
    pub total_cost: i64,
    pub currency: Currency,
    pub shares: Vec<ShareOfExpense>,
}

impl Expense {
    pub fn new(
        timestamp: i64,
        details: impl Into<String>,
        total_cost: i64,
        currency: Currency,
        shares: Vec<ShareOfExpense>,
    ) -> Self {
        Self {
            id: None,
            timestamp,
            details: details.into(),
            total_cost,
            currency,
            shares,
        }
    }

    /// Whether `user_id` holds a share of this expense.
    pub fn involves(&self, user_id: &str) -> bool {
        self.shares.iter().any(|s| s.counterparty == user_id)
    }

    /// Share of `user_id`, if any.
    pub fn share_of(&self, user_id: &str) -> Option<&ShareOfExpense> {
        self.shares.iter().find(|s| s.counterparty == user_id)
    }

    /// Sum of every signed share.
    pub fn share_total(&self) -> i64 {
        self.shares.iter().map(|s| s.signed_cost).sum()
    }

    /// `true` when shares net to zero or add up to `total_cost`.
    ///
    /// Informational only: writes never enforce it.
    pub fn is_balanced(&self) -> bool {
        let total = self.share_total();
        total == 0 || total == self.total_cost
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub timestamp: i64,
    pub details: String,
    pub cost: i64,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::spendings::Entity")]
    Spendings,
}

impl Related<super::spendings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spendings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn header(id: Uuid, expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            timestamp: ActiveValue::Set(expense.timestamp),
            details: ActiveValue::Set(expense.details.clone()),
            cost: ActiveValue::Set(expense.total_cost),
            currency: ActiveValue::Set(expense.currency.code().to_string()),
        }
    }

    /// Every column `Set` from a previously read row, ready for re-insertion.
    pub(crate) fn restored(model: Model) -> Self {
        Self {
            id: ActiveValue::Set(model.id),
            timestamp: ActiveValue::Set(model.timestamp),
            details: ActiveValue::Set(model.details),
            cost: ActiveValue::Set(model.cost),
            currency: ActiveValue::Set(model.currency),
        }
    }
}

impl TryFrom<(Model, Vec<spendings::Model>)> for Expense {
    type Error = EngineError;

    fn try_from((model, rows): (Model, Vec<spendings::Model>)) -> Result<Self, Self::Error> {
        let id = crate::util::parse_uuid(&model.id, "expense")?;
        let mut shares: Vec<ShareOfExpense> = rows.into_iter().map(ShareOfExpense::from).collect();
        shares.sort_by(|a, b| a.counterparty.cmp(&b.counterparty));
        Ok(Self {
            id: Some(id),
            timestamp: model.timestamp,
            details: model.details,
            total_cost: model.cost,
            currency: model_currency(&model.currency)?,
            shares,
        })
    }
}
