use uuid::Uuid;

use crate::{EngineError, Expense, Journal, ResultEngine};

use super::{Balance, LedgerRepository};

/// Participation checks around the ledger.
///
/// An actor may only add, read or remove expenses it holds a share of.
#[derive(Clone, Debug)]
pub struct LedgerController {
    repository: LedgerRepository,
}

impl LedgerController {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }

    /// Records `expense` and returns its new id.
    pub async fn add_expense(
        &self,
        actor: &str,
        expense: Expense,
        journal: &mut Journal,
    ) -> ResultEngine<Uuid> {
        if !expense.involves(actor) {
            return Err(EngineError::NotYourExpense(format!(
                "{actor} holds no share of the new expense"
            )));
        }
        if !expense.is_balanced() {
            tracing::debug!(
                "expense \"{}\" shares sum to {} for a total of {}",
                expense.details,
                expense.share_total(),
                expense.total_cost
            );
        }

        let id = journal
            .perform(self.repository.add_expense(expense))
            .await?;
        tracing::info!("{actor} added expense {id}");
        Ok(id)
    }

    /// Removes expense `id` and returns the rows the removal deleted.
    pub async fn remove_expense(
        &self,
        actor: &str,
        id: Uuid,
        journal: &mut Journal,
    ) -> ResultEngine<Expense> {
        self.get_expense(actor, id).await?;
        let expense = journal
            .perform(self.repository.remove_expense(id))
            .await?;
        tracing::info!("{actor} removed expense {id}");
        Ok(expense)
    }

    pub async fn get_expense(&self, actor: &str, id: Uuid) -> ResultEngine<Expense> {
        let expense = self
            .repository
            .get_expense(id)
            .await?
            .ok_or_else(|| EngineError::ExpenseNotFound(id.to_string()))?;
        if !expense.involves(actor) {
            return Err(EngineError::NotYourExpense(format!(
                "{actor} holds no share of {id}"
            )));
        }
        Ok(expense)
    }

    /// Expenses `actor` shares with `other`, oldest first.
    pub async fn expenses_between(&self, actor: &str, other: &str) -> ResultEngine<Vec<Expense>> {
        self.repository.expenses_between(actor, other).await
    }

    pub async fn balance_of(&self, actor: &str) -> ResultEngine<Vec<Balance>> {
        self.repository.balance_of(actor).await
    }
}
