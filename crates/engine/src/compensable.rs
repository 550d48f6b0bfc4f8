//! Compensable operations.
//!
//! A [`Compensable`] pairs exactly one forward mutation (`perform`) with its
//! semantic inverse (`rollback`). Repositories hand them out unperformed;
//! constructing one never touches the store. Whatever the inverse needs to know
//! about the prior state is captured while `perform` runs, not before.
//!
//! A [`Journal`] records the operations performed during one business
//! operation so the caller can undo all of them, newest first, when a later
//! step fails.

use async_trait::async_trait;

use crate::{EngineError, ResultEngine};

#[async_trait]
pub trait Compensable: Send {
    /// Value produced by the forward action (e.g. a freshly minted id).
    type Output: Send;

    /// Runs the forward mutation once.
    async fn perform(&mut self) -> ResultEngine<Self::Output>;

    /// Restores the state that existed immediately before `perform`.
    ///
    /// Fails with [`EngineError::Compensation`] if `perform` has not
    /// succeeded, and with [`EngineError::RollbackFailed`] if the store
    /// rejects the inverse mutation.
    async fn rollback(&mut self) -> ResultEngine<()>;

    /// Short human description used in logs.
    fn describe(&self) -> String;
}

/// Object-safe view of a performed operation, kept by the [`Journal`].
#[async_trait]
trait Undo: Send {
    async fn undo(&mut self) -> ResultEngine<()>;
    fn describe(&self) -> String;
}

#[async_trait]
impl<C> Undo for C
where
    C: Compensable,
{
    async fn undo(&mut self) -> ResultEngine<()> {
        self.rollback().await
    }

    fn describe(&self) -> String {
        Compensable::describe(self)
    }
}

/// Performed operations of one business operation, in execution order.
#[derive(Default)]
pub struct Journal {
    performed: Vec<Box<dyn Undo>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs `op` and records it on success. A failed `perform` leaves
    /// nothing to compensate and is not recorded.
    pub async fn perform<C>(&mut self, mut op: C) -> ResultEngine<C::Output>
    where
        C: Compensable + 'static,
    {
        let output = op.perform().await?;
        tracing::debug!("performed {}", Compensable::describe(&op));
        self.performed.push(Box::new(op));
        Ok(output)
    }

    pub fn len(&self) -> usize {
        self.performed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.performed.is_empty()
    }

    /// Rolls back every recorded operation, newest first.
    ///
    /// Stops at the first rollback that fails: the operations recorded before
    /// it stay in place and are reported in the log.
    pub async fn rollback(mut self) -> ResultEngine<()> {
        while let Some(mut op) = self.performed.pop() {
            let label = op.describe();
            tracing::warn!("compensating {label}");
            if let Err(err) = op.undo().await {
                tracing::error!(
                    "rollback of {label} failed, {} earlier operation(s) left uncompensated: {err}",
                    self.performed.len()
                );
                self.performed.clear();
                return Err(EngineError::rollback_failed(err));
            }
        }
        Ok(())
    }

    /// Accepts every recorded operation; nothing will be compensated.
    pub fn commit(mut self) {
        self.performed.clear();
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        if !self.performed.is_empty() {
            tracing::warn!(
                "journal dropped with {} performed operation(s) neither committed nor rolled back",
                self.performed.len()
            );
        }
    }
}

impl core::fmt::Debug for Journal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Journal")
            .field(
                "performed",
                &self.performed.iter().map(|op| op.describe()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
