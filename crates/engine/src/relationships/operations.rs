use async_trait::async_trait;
use sea_orm::{DatabaseConnection, prelude::*};

use crate::{
    Compensable, EngineError, ResultEngine, friend_requests, util::is_unique_violation,
};

/// Inserts `(sender, target)`; the inverse deletes it.
#[derive(Debug)]
pub struct AddEdge {
    database: DatabaseConnection,
    sender: String,
    target: String,
    performed: bool,
}

impl AddEdge {
    pub(super) fn new(database: DatabaseConnection, sender: &str, target: &str) -> Self {
        Self {
            database,
            sender: sender.to_string(),
            target: target.to_string(),
            performed: false,
        }
    }
}

#[async_trait]
impl Compensable for AddEdge {
    type Output = ();

    async fn perform(&mut self) -> ResultEngine<()> {
        if self.performed {
            return Err(EngineError::Compensation(format!(
                "{} already performed",
                self.describe()
            )));
        }
        friend_requests::Entity::insert(friend_requests::ActiveModel::edge(
            &self.sender,
            &self.target,
        ))
        .exec_without_returning(&self.database)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                EngineError::AlreadySent(format!("{} -> {}", self.sender, self.target))
            } else {
                err.into()
            }
        })?;
        tracing::debug!("edge {} -> {} inserted", self.sender, self.target);
        self.performed = true;
        Ok(())
    }

    async fn rollback(&mut self) -> ResultEngine<()> {
        if !self.performed {
            return Err(EngineError::Compensation(format!(
                "{} was not performed",
                self.describe()
            )));
        }
        friend_requests::Entity::delete_by_id((self.sender.clone(), self.target.clone()))
            .exec(&self.database)
            .await
            .map_err(|err| EngineError::rollback_failed(err.into()))?;
        tracing::debug!("edge {} -> {} deleted", self.sender, self.target);
        self.performed = false;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("add edge {} -> {}", self.sender, self.target)
    }
}

/// Deletes `(sender, target)` if present.
///
/// Whether a row was actually removed is taken from the delete itself, so the
/// inverse recreates the edge only when the forward step removed it.
#[derive(Debug)]
pub struct RemoveEdge {
    database: DatabaseConnection,
    sender: String,
    target: String,
    /// `None` until performed, then whether the delete hit a row.
    removed: Option<bool>,
}

impl RemoveEdge {
    pub(super) fn new(database: DatabaseConnection, sender: &str, target: &str) -> Self {
        Self {
            database,
            sender: sender.to_string(),
            target: target.to_string(),
            removed: None,
        }
    }

    /// Whether the forward step removed an existing edge.
    pub fn removed(&self) -> Option<bool> {
        self.removed
    }
}

#[async_trait]
impl Compensable for RemoveEdge {
    type Output = ();

    async fn perform(&mut self) -> ResultEngine<()> {
        if self.removed.is_some() {
            return Err(EngineError::Compensation(format!(
                "{} already performed",
                self.describe()
            )));
        }
        let res = friend_requests::Entity::delete_by_id((self.sender.clone(), self.target.clone()))
            .exec(&self.database)
            .await?;
        let removed = res.rows_affected > 0;
        tracing::debug!(
            "edge {} -> {} delete affected {} row(s)",
            self.sender,
            self.target,
            res.rows_affected
        );
        self.removed = Some(removed);
        Ok(())
    }

    async fn rollback(&mut self) -> ResultEngine<()> {
        let Some(removed) = self.removed else {
            return Err(EngineError::Compensation(format!(
                "{} was not performed",
                self.describe()
            )));
        };
        if removed {
            let res = friend_requests::Entity::insert(friend_requests::ActiveModel::edge(
                &self.sender,
                &self.target,
            ))
            .exec_without_returning(&self.database)
            .await;
            match res {
                Ok(_) => {}
                // Recreated in the meantime: the prior state holds again.
                Err(err) if is_unique_violation(&err) => {}
                Err(err) => return Err(EngineError::rollback_failed(err.into())),
            }
            tracing::debug!("edge {} -> {} restored", self.sender, self.target);
        }
        self.removed = None;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remove edge {} -> {}", self.sender, self.target)
    }
}
