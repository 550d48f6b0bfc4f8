//! Friend-request edges.
//!
//! A row `(sender, target)` means `sender` asked `target` to be friends. It is
//! the only relationship fact the engine stores; friendship is two edges in
//! opposite directions.

use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "friend_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sender: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub target: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn edge(sender: &str, target: &str) -> Self {
        Self {
            sender: ActiveValue::Set(sender.to_string()),
            target: ActiveValue::Set(target.to_string()),
        }
    }
}
