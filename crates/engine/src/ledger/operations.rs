use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Compensable, EngineError, Expense, ResultEngine, deals, spendings, with_tx};

/// Header plus shares of one expense, as stored.
pub(super) type ExpenseRows = (deals::Model, Vec<spendings::Model>);

pub(super) async fn load_rows<C>(db: &C, id: &str) -> ResultEngine<Option<ExpenseRows>>
where
    C: ConnectionTrait,
{
    let Some(header) = deals::Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let shares = spendings::Entity::find()
        .filter(spendings::Column::DealId.eq(id.to_string()))
        .all(db)
        .await?;
    Ok(Some((header, shares)))
}

async fn insert_rows(
    database: &DatabaseConnection,
    header: deals::ActiveModel,
    shares: Vec<spendings::ActiveModel>,
) -> ResultEngine<()> {
    with_tx!(database, |db_tx| {
        deals::Entity::insert(header)
            .exec_without_returning(&db_tx)
            .await?;
        if !shares.is_empty() {
            spendings::Entity::insert_many(shares)
                .exec_without_returning(&db_tx)
                .await?;
        }
        Ok(())
    })
}

async fn delete_rows(database: &DatabaseConnection, id: &str) -> ResultEngine<u64> {
    with_tx!(database, |db_tx| {
        spendings::Entity::delete_many()
            .filter(spendings::Column::DealId.eq(id.to_string()))
            .exec(&db_tx)
            .await?;
        let res = deals::Entity::delete_by_id(id.to_string())
            .exec(&db_tx)
            .await?;
        Ok(res.rows_affected)
    })
}

/// Reads and deletes an expense in one store transaction.
///
/// The rows are decoded before the delete, so an unreadable expense is never
/// removed.
async fn take_rows(
    database: &DatabaseConnection,
    id: &str,
) -> ResultEngine<Option<(ExpenseRows, Expense)>> {
    with_tx!(database, |db_tx| {
        match load_rows(&db_tx, id).await? {
            Some(rows) => {
                let expense = Expense::try_from(rows.clone())?;
                spendings::Entity::delete_many()
                    .filter(spendings::Column::DealId.eq(id.to_string()))
                    .exec(&db_tx)
                    .await?;
                deals::Entity::delete_by_id(id.to_string())
                    .exec(&db_tx)
                    .await?;
                Ok(Some((rows, expense)))
            }
            None => Ok(None),
        }
    })
}

/// Inserts an expense under a freshly generated id; the inverse deletes it.
#[derive(Debug)]
pub struct AddExpense {
    database: DatabaseConnection,
    expense: Expense,
    inserted: Option<Uuid>,
}

impl AddExpense {
    pub(super) fn new(database: DatabaseConnection, expense: Expense) -> Self {
        Self {
            database,
            expense,
            inserted: None,
        }
    }

    /// Id minted by the forward step, once performed.
    pub fn expense_id(&self) -> Option<Uuid> {
        self.inserted
    }
}

#[async_trait]
impl Compensable for AddExpense {
    type Output = Uuid;

    async fn perform(&mut self) -> ResultEngine<Uuid> {
        if self.inserted.is_some() {
            return Err(EngineError::Compensation(format!(
                "{} already performed",
                self.describe()
            )));
        }
        let id = Uuid::new_v4();
        let header = deals::ActiveModel::header(id, &self.expense);
        let shares = self
            .expense
            .shares
            .iter()
            .map(|share| spendings::ActiveModel::share(id, share))
            .collect();
        insert_rows(&self.database, header, shares).await?;
        tracing::debug!(
            "expense {id} inserted with {} share(s)",
            self.expense.shares.len()
        );
        self.inserted = Some(id);
        Ok(id)
    }

    async fn rollback(&mut self) -> ResultEngine<()> {
        let Some(id) = self.inserted else {
            return Err(EngineError::Compensation(format!(
                "{} was not performed",
                self.describe()
            )));
        };
        delete_rows(&self.database, &id.to_string())
            .await
            .map_err(EngineError::rollback_failed)?;
        tracing::debug!("expense {id} deleted");
        self.inserted = None;
        Ok(())
    }

    fn describe(&self) -> String {
        match self.inserted {
            Some(id) => format!("add expense {id}"),
            None => format!("add expense \"{}\"", self.expense.details),
        }
    }
}

/// Deletes an expense and yields it as it was deleted; the inverse re-inserts
/// exactly the rows the forward step read, under the same ids.
#[derive(Debug)]
pub struct RemoveExpense {
    database: DatabaseConnection,
    id: Uuid,
    removed: Option<ExpenseRows>,
}

impl RemoveExpense {
    pub(super) fn new(database: DatabaseConnection, id: Uuid) -> Self {
        Self {
            database,
            id,
            removed: None,
        }
    }

    /// The expense as it was right before the forward step deleted it.
    pub fn removed_expense(&self) -> Option<ResultEngine<Expense>> {
        self.removed.clone().map(Expense::try_from)
    }
}

#[async_trait]
impl Compensable for RemoveExpense {
    type Output = Expense;

    async fn perform(&mut self) -> ResultEngine<Expense> {
        if self.removed.is_some() {
            return Err(EngineError::Compensation(format!(
                "{} already performed",
                self.describe()
            )));
        }
        let (rows, expense) = take_rows(&self.database, &self.id.to_string())
            .await?
            .ok_or_else(|| EngineError::ExpenseNotFound(self.id.to_string()))?;
        tracing::debug!("expense {} deleted ({} share(s))", self.id, rows.1.len());
        self.removed = Some(rows);
        Ok(expense)
    }

    async fn rollback(&mut self) -> ResultEngine<()> {
        let Some((header, shares)) = self.removed.as_ref() else {
            return Err(EngineError::Compensation(format!(
                "{} was not performed",
                self.describe()
            )));
        };
        let header = deals::ActiveModel::restored(header.clone());
        let shares = shares
            .iter()
            .cloned()
            .map(spendings::ActiveModel::restored)
            .collect();
        insert_rows(&self.database, header, shares)
            .await
            .map_err(EngineError::rollback_failed)?;
        tracing::debug!("expense {} restored", self.id);
        self.removed = None;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remove expense {}", self.id)
    }
}
