//! Expense shares.
//!
//! A [`ShareOfExpense`] is one party's signed stake in an
//! [`Expense`](crate::Expense):
//! - positive values: the party is owed money on this expense
//! - negative values: the party owes money on this expense
//!
//! The sign convention belongs to the caller; the ledger only sums.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOfExpense {
    pub counterparty: String,
    pub signed_cost: i64,
}

impl ShareOfExpense {
    pub fn new(counterparty: impl Into<String>, signed_cost: i64) -> Self {
        Self {
            counterparty: counterparty.into(),
            signed_cost,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "spendings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub deal_id: String,
    pub cost: i64,
    pub counterparty: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deals::Entity",
        from = "Column::DealId",
        to = "super::deals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Deals,
}

impl Related<super::deals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn share(deal_id: Uuid, share: &ShareOfExpense) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            deal_id: ActiveValue::Set(deal_id.to_string()),
            cost: ActiveValue::Set(share.signed_cost),
            counterparty: ActiveValue::Set(share.counterparty.clone()),
        }
    }

    /// Every column `Set` from a previously read row, ready for re-insertion.
    pub(crate) fn restored(model: Model) -> Self {
        Self {
            id: ActiveValue::Set(model.id),
            deal_id: ActiveValue::Set(model.deal_id),
            cost: ActiveValue::Set(model.cost),
            counterparty: ActiveValue::Set(model.counterparty),
        }
    }
}

impl From<Model> for ShareOfExpense {
    fn from(model: Model) -> Self {
        Self {
            counterparty: model.counterparty,
            signed_cost: model.cost,
        }
    }
}
