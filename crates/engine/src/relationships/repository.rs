use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::{Condition, DatabaseConnection, QueryFilter, Statement, prelude::*};

use crate::{ResultEngine, friend_requests};

use super::{AddEdge, FriendStatus, RemoveEdge};

/// Both edges exist.
const FRIENDS_SQL: &str = "SELECT o.target AS user_id \
     FROM friend_requests o \
     JOIN friend_requests i ON i.sender = o.target AND i.target = o.sender \
     WHERE o.sender = ?;";

/// `(u, user)` exists, `(user, u)` does not.
const PENDING_SUBSCRIBERS_SQL: &str = "SELECT i.sender AS user_id \
     FROM friend_requests i \
     LEFT JOIN friend_requests o ON o.sender = i.target AND o.target = i.sender \
     WHERE i.target = ? AND o.sender IS NULL;";

/// `(user, u)` exists, `(u, user)` does not.
const PENDING_SUBSCRIPTIONS_SQL: &str = "SELECT o.target AS user_id \
     FROM friend_requests o \
     LEFT JOIN friend_requests i ON i.sender = o.target AND i.target = o.sender \
     WHERE o.sender = ? AND i.sender IS NULL;";

/// Reads and writes directed friend-request edges.
#[derive(Clone, Debug)]
pub struct FriendRepository {
    database: DatabaseConnection,
}

impl FriendRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub async fn edge_exists(&self, sender: &str, target: &str) -> ResultEngine<bool> {
        friend_requests::Entity::find_by_id((sender.to_string(), target.to_string()))
            .one(&self.database)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }

    /// Returns `(a -> b exists, b -> a exists)`, read in one query.
    pub async fn edge_pair(&self, a: &str, b: &str) -> ResultEngine<(bool, bool)> {
        let rows = friend_requests::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(friend_requests::Column::Sender.eq(a))
                            .add(friend_requests::Column::Target.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(friend_requests::Column::Sender.eq(b))
                            .add(friend_requests::Column::Target.eq(a)),
                    ),
            )
            .all(&self.database)
            .await?;

        let forward = rows.iter().any(|r| r.sender == a && r.target == b);
        let backward = rows.iter().any(|r| r.sender == b && r.target == a);
        Ok((forward, backward))
    }

    /// `true` iff `sender` asked `target` and `target` has not asked back.
    pub async fn has_pending_request(&self, sender: &str, target: &str) -> ResultEngine<bool> {
        let (forward, backward) = self.edge_pair(sender, target).await?;
        Ok(forward && !backward)
    }

    pub async fn friends_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.select_users(FRIENDS_SQL, user).await
    }

    /// Users waiting on `user` to accept their request.
    pub async fn pending_subscribers_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.select_users(PENDING_SUBSCRIBERS_SQL, user).await
    }

    /// Users `user` is waiting on.
    pub async fn pending_subscriptions_of(&self, user: &str) -> ResultEngine<BTreeSet<String>> {
        self.select_users(PENDING_SUBSCRIPTIONS_SQL, user).await
    }

    /// Status of every candidate as seen from `subject`.
    ///
    /// Duplicated candidates collapse into one entry; `subject` itself maps to
    /// [`FriendStatus::SelfUser`].
    pub async fn statuses_of<I, S>(
        &self,
        subject: &str,
        candidates: I,
    ) -> ResultEngine<HashMap<String, FriendStatus>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut statuses: HashMap<String, FriendStatus> = HashMap::new();
        let mut others: Vec<String> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            if statuses.contains_key(candidate) {
                continue;
            }
            if candidate == subject {
                statuses.insert(candidate.to_string(), FriendStatus::SelfUser);
            } else {
                statuses.insert(candidate.to_string(), FriendStatus::None);
                others.push(candidate.to_string());
            }
        }
        if others.is_empty() {
            return Ok(statuses);
        }

        let rows = friend_requests::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(friend_requests::Column::Sender.eq(subject))
                            .add(friend_requests::Column::Target.is_in(others.clone())),
                    )
                    .add(
                        Condition::all()
                            .add(friend_requests::Column::Target.eq(subject))
                            .add(friend_requests::Column::Sender.is_in(others.clone())),
                    ),
            )
            .all(&self.database)
            .await?;

        let mut outgoing: HashSet<&str> = HashSet::new();
        let mut incoming: HashSet<&str> = HashSet::new();
        for row in &rows {
            if row.sender == subject {
                outgoing.insert(row.target.as_str());
            } else {
                incoming.insert(row.sender.as_str());
            }
        }

        for other in &others {
            let status = FriendStatus::from_edges(
                outgoing.contains(other.as_str()),
                incoming.contains(other.as_str()),
            );
            statuses.insert(other.clone(), status);
        }
        Ok(statuses)
    }

    /// Unperformed insertion of the edge `(sender, target)`.
    pub fn add_edge(&self, sender: &str, target: &str) -> AddEdge {
        AddEdge::new(self.database.clone(), sender, target)
    }

    /// Unperformed removal of the edge `(sender, target)`.
    pub fn remove_edge(&self, sender: &str, target: &str) -> RemoveEdge {
        RemoveEdge::new(self.database.clone(), sender, target)
    }

    async fn select_users(&self, sql: &str, user: &str) -> ResultEngine<BTreeSet<String>> {
        let backend = self.database.get_database_backend();
        let rows = self
            .database
            .query_all(Statement::from_sql_and_values(
                backend,
                sql,
                vec![user.into()],
            ))
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String>("", "user_id").map_err(Into::into))
            .collect()
    }
}
