use std::collections::{BTreeSet, HashMap};

use crate::{EngineError, Journal, ResultEngine};

use super::{FriendRepository, FriendStatus};

/// Legal transitions between relationship states.
///
/// Every mutation records its performed operation in the caller's
/// [`Journal`], so a later failure in the same business operation can undo
/// it.
#[derive(Clone, Debug)]
pub struct FriendController {
    repository: FriendRepository,
}

impl FriendController {
    pub fn new(repository: FriendRepository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &FriendRepository {
        &self.repository
    }

    /// `sender` asks `target` to be friends.
    pub async fn send_request(
        &self,
        sender: &str,
        target: &str,
        journal: &mut Journal,
    ) -> ResultEngine<()> {
        if sender == target {
            return Err(EngineError::InvalidRequest(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        let (outgoing, incoming) = self.repository.edge_pair(sender, target).await?;
        if outgoing {
            return Err(EngineError::AlreadySent(format!("{sender} -> {target}")));
        }
        if incoming {
            return Err(EngineError::HasIncomingRequest(format!(
                "{target} -> {sender}"
            )));
        }

        journal
            .perform(self.repository.add_edge(sender, target))
            .await?;
        tracing::info!("{sender} sent a friend request to {target}");
        Ok(())
    }

    /// `accepter` accepts the pending request of `requester`, making the pair
    /// mutual.
    pub async fn accept_request(
        &self,
        requester: &str,
        accepter: &str,
        journal: &mut Journal,
    ) -> ResultEngine<()> {
        if !self
            .repository
            .has_pending_request(requester, accepter)
            .await?
        {
            return Err(EngineError::NoSuchRequest(format!(
                "{requester} -> {accepter}"
            )));
        }

        journal
            .perform(self.repository.add_edge(accepter, requester))
            .await?;
        tracing::info!("{accepter} accepted the friend request of {requester}");
        Ok(())
    }

    /// Withdraws (by `sender`) or rejects (by `target`) the pending request
    /// `sender -> target`.
    pub async fn rollback_or_reject(
        &self,
        sender: &str,
        target: &str,
        journal: &mut Journal,
    ) -> ResultEngine<()> {
        if !self.repository.has_pending_request(sender, target).await? {
            return Err(EngineError::NoSuchRequest(format!("{sender} -> {target}")));
        }

        journal
            .perform(self.repository.remove_edge(sender, target))
            .await?;
        tracing::info!("friend request {sender} -> {target} withdrawn");
        Ok(())
    }

    /// `user` stops being friends with `friend`.
    ///
    /// Only `user -> friend` is removed: `friend` is left with a pending
    /// request towards `user`.
    pub async fn unfriend(
        &self,
        user: &str,
        friend: &str,
        journal: &mut Journal,
    ) -> ResultEngine<()> {
        let (outgoing, incoming) = self.repository.edge_pair(user, friend).await?;
        if !(outgoing && incoming) {
            return Err(EngineError::NotAFriend(format!("{user} and {friend}")));
        }

        journal
            .perform(self.repository.remove_edge(user, friend))
            .await?;
        tracing::info!("{user} unfriended {friend}");
        Ok(())
    }

    pub async fn friends_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.repository.friends_of(user).await
    }

    pub async fn pending_subscribers_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.repository.pending_subscribers_of(user).await
    }

    pub async fn pending_subscriptions_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.repository.pending_subscriptions_of(user).await
    }

    pub async fn statuses_of<I, S>(
        &self,
        subject: &str,
        candidates: I,
    ) -> ResultEngine<HashMap<String, FriendStatus>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.repository.statuses_of(subject, candidates).await
    }
}
