use sea_orm::{DatabaseConnection, FromQueryResult, Statement, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, ResultEngine, ShareOfExpense,
    util::{model_currency, parse_uuid},
};

use super::{AddExpense, Balance, RemoveExpense, operations::load_rows};

/// Expenses where both parties hold a share, with each party's share summed
/// per expense.
const EXPENSES_BETWEEN_SQL: &str = "SELECT d.id AS id, d.timestamp AS timestamp, \
            d.details AS details, d.cost AS cost, d.currency AS currency, \
            sa.cost AS a_cost, sb.cost AS b_cost \
     FROM deals d \
     JOIN (SELECT deal_id, SUM(cost) AS cost FROM spendings WHERE counterparty = ? GROUP BY deal_id) sa \
       ON sa.deal_id = d.id \
     JOIN (SELECT deal_id, SUM(cost) AS cost FROM spendings WHERE counterparty = ? GROUP BY deal_id) sb \
       ON sb.deal_id = d.id \
     ORDER BY d.timestamp ASC, d.id ASC;";

/// The actor's own share of each expense, summed per other party and
/// currency.
const BALANCE_SQL: &str = "SELECT other.counterparty AS counterparty, d.currency AS currency, \
            SUM(mine.cost) AS total \
     FROM (SELECT deal_id, SUM(cost) AS cost FROM spendings WHERE counterparty = ? GROUP BY deal_id) mine \
     JOIN deals d ON d.id = mine.deal_id \
     JOIN (SELECT DISTINCT deal_id, counterparty FROM spendings WHERE counterparty <> ?) other \
       ON other.deal_id = mine.deal_id \
     GROUP BY other.counterparty, d.currency \
     ORDER BY other.counterparty ASC, d.currency ASC;";

#[derive(Debug, FromQueryResult)]
struct PairRow {
    id: String,
    timestamp: i64,
    details: String,
    cost: i64,
    currency: String,
    a_cost: i64,
    b_cost: i64,
}

#[derive(Debug, FromQueryResult)]
struct BalanceRow {
    counterparty: String,
    currency: String,
    total: i64,
}

/// Stores expenses and projects balances out of them.
#[derive(Clone, Debug)]
pub struct LedgerRepository {
    database: DatabaseConnection,
}

impl LedgerRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Unperformed insertion of `expense`; performing it yields the new id.
    pub fn add_expense(&self, expense: Expense) -> AddExpense {
        AddExpense::new(self.database.clone(), expense)
    }

    /// Unperformed removal of expense `id`.
    pub fn remove_expense(&self, id: Uuid) -> RemoveExpense {
        RemoveExpense::new(self.database.clone(), id)
    }

    /// The expense with its shares ordered by counterparty, if it exists.
    pub async fn get_expense(&self, id: Uuid) -> ResultEngine<Option<Expense>> {
        load_rows(&self.database, &id.to_string())
            .await?
            .map(Expense::try_from)
            .transpose()
    }

    /// Two-party view of every expense shared by `a` and `b`, oldest first.
    ///
    /// Each returned expense carries only the shares of `a` and `b`.
    pub async fn expenses_between(&self, a: &str, b: &str) -> ResultEngine<Vec<Expense>> {
        let backend = self.database.get_database_backend();
        let rows = PairRow::find_by_statement(Statement::from_sql_and_values(
            backend,
            EXPENSES_BETWEEN_SQL,
            vec![a.into(), b.into()],
        ))
        .all(&self.database)
        .await?;

        rows.into_iter()
            .map(|row| {
                let mut shares = vec![ShareOfExpense::new(a, row.a_cost)];
                if a != b {
                    shares.push(ShareOfExpense::new(b, row.b_cost));
                }
                shares.sort_by(|x, y| x.counterparty.cmp(&y.counterparty));
                Ok(Expense {
                    id: Some(parse_uuid(&row.id, "expense")?),
                    timestamp: row.timestamp,
                    details: row.details,
                    total_cost: row.cost,
                    currency: model_currency(&row.currency)?,
                    shares,
                })
            })
            .collect()
    }

    /// Balances of `actor` against every user it shares an expense with,
    /// ordered by counterparty.
    pub async fn balance_of(&self, actor: &str) -> ResultEngine<Vec<Balance>> {
        let backend = self.database.get_database_backend();
        let rows = BalanceRow::find_by_statement(Statement::from_sql_and_values(
            backend,
            BALANCE_SQL,
            vec![actor.into(), actor.into()],
        ))
        .all(&self.database)
        .await?;

        let mut balances: Vec<Balance> = Vec::new();
        for row in rows {
            let currency = model_currency(&row.currency)?;
            match balances.last_mut() {
                Some(last) if last.counterparty == row.counterparty => {
                    *last.currencies.entry(currency).or_insert(0) += row.total;
                }
                _ => {
                    let mut balance = Balance::new(row.counterparty);
                    balance.currencies.insert(currency, row.total);
                    balances.push(balance);
                }
            }
        }
        Ok(balances)
    }
}
