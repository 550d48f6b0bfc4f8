use std::collections::BTreeSet;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Compensable, Engine, EngineError, ErrorCode, FriendStatus, Journal};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn edge_count(db: &DatabaseConnection) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM friend_requests;",
        ))
        .await
        .unwrap();
    row.and_then(|r| r.try_get("", "n").ok()).unwrap_or(0)
}

fn set(users: &[&str]) -> BTreeSet<String> {
    users.iter().map(ToString::to_string).collect()
}

/// `friends_of`, `pending_subscribers_of`, `pending_subscriptions_of`.
async fn views(engine: &Engine, user: &str) -> [BTreeSet<String>; 3] {
    let repo = engine.friends().repository();
    [
        repo.friends_of(user).await.unwrap(),
        repo.pending_subscribers_of(user).await.unwrap(),
        repo.pending_subscriptions_of(user).await.unwrap(),
    ]
}

#[tokio::test]
async fn add_edge_creates_a_one_sided_request() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();

    repo.add_edge("alice", "bob").perform().await.unwrap();

    assert!(repo.has_pending_request("alice", "bob").await.unwrap());
    assert!(!repo.has_pending_request("bob", "alice").await.unwrap());
    assert_eq!(
        repo.pending_subscriptions_of("alice").await.unwrap(),
        set(&["bob"])
    );
    assert_eq!(
        repo.pending_subscribers_of("bob").await.unwrap(),
        set(&["alice"])
    );
}

#[tokio::test]
async fn add_edge_rollback_restores_every_view() {
    let (engine, db) = engine_with_db().await;
    let repo = engine.friends().repository();
    repo.add_edge("carol", "alice").perform().await.unwrap();
    repo.add_edge("bob", "dave").perform().await.unwrap();

    let alice_before = views(&engine, "alice").await;
    let bob_before = views(&engine, "bob").await;

    let mut op = repo.add_edge("alice", "bob");
    op.perform().await.unwrap();
    assert_ne!(views(&engine, "alice").await, alice_before);
    op.rollback().await.unwrap();

    assert_eq!(views(&engine, "alice").await, alice_before);
    assert_eq!(views(&engine, "bob").await, bob_before);
    assert_eq!(edge_count(&db).await, 2);
}

#[tokio::test]
async fn both_edges_make_a_friendship() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();

    repo.add_edge("alice", "bob").perform().await.unwrap();
    repo.add_edge("bob", "alice").perform().await.unwrap();

    let [alice_friends, alice_subscribers, alice_subscriptions] = views(&engine, "alice").await;
    let [bob_friends, bob_subscribers, bob_subscriptions] = views(&engine, "bob").await;
    assert!(alice_friends.contains("bob"));
    assert!(bob_friends.contains("alice"));
    assert!(alice_subscribers.is_empty() && alice_subscriptions.is_empty());
    assert!(bob_subscribers.is_empty() && bob_subscriptions.is_empty());
    assert!(!repo.has_pending_request("alice", "bob").await.unwrap());
}

#[tokio::test]
async fn duplicate_edge_fails_as_already_sent() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();

    repo.add_edge("alice", "bob").perform().await.unwrap();
    let err = repo.add_edge("alice", "bob").perform().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadySent);
}

#[tokio::test]
async fn remove_absent_edge_is_a_no_op_both_ways() {
    let (engine, db) = engine_with_db().await;
    let repo = engine.friends().repository();
    repo.add_edge("bob", "alice").perform().await.unwrap();

    let mut op = repo.remove_edge("alice", "bob");
    op.perform().await.unwrap();
    assert_eq!(op.removed(), Some(false));
    op.rollback().await.unwrap();

    assert!(!repo.edge_exists("alice", "bob").await.unwrap());
    assert!(repo.edge_exists("bob", "alice").await.unwrap());
    assert_eq!(edge_count(&db).await, 1);
}

#[tokio::test]
async fn remove_edge_rollback_recreates_it() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();
    repo.add_edge("alice", "bob").perform().await.unwrap();

    let mut op = repo.remove_edge("alice", "bob");
    op.perform().await.unwrap();
    assert_eq!(op.removed(), Some(true));
    assert!(!repo.edge_exists("alice", "bob").await.unwrap());

    op.rollback().await.unwrap();
    assert!(repo.has_pending_request("alice", "bob").await.unwrap());
}

#[tokio::test]
async fn remove_edge_looks_at_the_store_when_performed() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();

    // Built while the edge does not exist yet.
    let mut op = repo.remove_edge("alice", "bob");
    repo.add_edge("alice", "bob").perform().await.unwrap();

    op.perform().await.unwrap();
    assert_eq!(op.removed(), Some(true));
    op.rollback().await.unwrap();
    assert!(repo.edge_exists("alice", "bob").await.unwrap());
}

#[tokio::test]
async fn remove_edge_rollback_accepts_an_edge_recreated_meanwhile() {
    let (engine, db) = engine_with_db().await;
    let repo = engine.friends().repository();
    repo.add_edge("alice", "bob").perform().await.unwrap();

    let mut op = repo.remove_edge("alice", "bob");
    op.perform().await.unwrap();
    repo.add_edge("alice", "bob").perform().await.unwrap();

    op.rollback().await.unwrap();
    assert!(repo.edge_exists("alice", "bob").await.unwrap());
    assert_eq!(edge_count(&db).await, 1);
}

#[tokio::test]
async fn add_edge_rollback_failure_is_reported() {
    let (engine, db) = engine_with_db().await;
    let repo = engine.friends().repository();
    let mut op = repo.add_edge("alice", "bob");
    op.perform().await.unwrap();

    db.execute_unprepared("DROP TABLE friend_requests;")
        .await
        .unwrap();

    let err = op.rollback().await.unwrap_err();
    assert!(matches!(err, EngineError::RollbackFailed(_)));
    assert_eq!(err.code(), ErrorCode::Internal);
}

#[tokio::test]
async fn remove_edge_rollback_failure_is_reported() {
    let (engine, db) = engine_with_db().await;
    let repo = engine.friends().repository();
    repo.add_edge("alice", "bob").perform().await.unwrap();
    let mut op = repo.remove_edge("alice", "bob");
    op.perform().await.unwrap();

    db.execute_unprepared("DROP TABLE friend_requests;")
        .await
        .unwrap();

    let err = op.rollback().await.unwrap_err();
    assert!(matches!(err, EngineError::RollbackFailed(_)));
}

#[tokio::test]
async fn rollback_before_perform_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let repo = engine.friends().repository();

    let err = repo.add_edge("alice", "bob").rollback().await.unwrap_err();
    assert!(matches!(err, EngineError::Compensation(_)));
    let err = repo.remove_edge("alice", "bob").rollback().await.unwrap_err();
    assert!(matches!(err, EngineError::Compensation(_)));
}

#[tokio::test]
async fn send_request_twice_or_backwards_fails() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    journal.commit();

    let mut journal = Journal::new();
    let err = friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadySent);

    let err = friends
        .send_request("bob", "alice", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::HasIncomingRequest);
    assert!(journal.is_empty());
}

#[tokio::test]
async fn send_request_to_self_is_invalid() {
    let (engine, db) = engine_with_db().await;
    let mut journal = Journal::new();

    let err = engine
        .friends()
        .send_request("alice", "alice", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(edge_count(&db).await, 0);
}

#[tokio::test]
async fn accept_request_makes_the_pair_mutual() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    journal.commit();

    assert_eq!(friends.friends_of("alice").await.unwrap(), set(&["bob"]));
    assert_eq!(friends.friends_of("bob").await.unwrap(), set(&["alice"]));
}

#[tokio::test]
async fn accept_without_request_fails() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    let err = friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchRequest);

    // Accepting your own request is not a thing either.
    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    let err = friends
        .accept_request("bob", "alice", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchRequest);
    journal.commit();
}

#[tokio::test]
async fn accept_twice_fails() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    let err = friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchRequest);
    journal.commit();
}

#[tokio::test]
async fn reject_and_withdraw_remove_the_pending_request() {
    let (engine, db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    // Rejected by bob.
    friends
        .rollback_or_reject("alice", "bob", &mut journal)
        .await
        .unwrap();
    assert_eq!(edge_count(&db).await, 0);

    let err = friends
        .rollback_or_reject("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchRequest);
    journal.commit();
}

#[tokio::test]
async fn reject_does_not_apply_to_friends() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    let err = friends
        .rollback_or_reject("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchRequest);
    journal.commit();
}

#[tokio::test]
async fn unfriend_leaves_the_other_side_pending() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends.unfriend("alice", "bob", &mut journal).await.unwrap();
    journal.commit();

    let repo = friends.repository();
    assert!(repo.has_pending_request("bob", "alice").await.unwrap());
    assert!(!friends.friends_of("alice").await.unwrap().contains("bob"));
    assert!(!friends.friends_of("bob").await.unwrap().contains("alice"));
    assert_eq!(
        friends.pending_subscribers_of("alice").await.unwrap(),
        set(&["bob"])
    );
}

#[tokio::test]
async fn unfriend_requires_mutual() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    let err = friends
        .unfriend("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAFriend);

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    let err = friends
        .unfriend("alice", "bob", &mut journal)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAFriend);
    journal.commit();
}

#[tokio::test]
async fn journal_rollback_undoes_a_whole_business_operation() {
    let (engine, db) = engine_with_db().await;
    let friends = engine.friends();

    let mut setup = Journal::new();
    friends
        .send_request("alice", "bob", &mut setup)
        .await
        .unwrap();
    setup.commit();

    let mut journal = Journal::new();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .send_request("alice", "carol", &mut journal)
        .await
        .unwrap();
    friends.unfriend("bob", "alice", &mut journal).await.unwrap();
    assert_eq!(journal.len(), 3);

    journal.rollback().await.unwrap();

    let repo = friends.repository();
    assert!(repo.has_pending_request("alice", "bob").await.unwrap());
    assert!(!repo.edge_exists("alice", "carol").await.unwrap());
    assert!(friends.friends_of("alice").await.unwrap().is_empty());
    assert_eq!(edge_count(&db).await, 1);
}

#[tokio::test]
async fn statuses_match_the_set_queries() {
    let (engine, _db) = engine_with_db().await;
    let friends = engine.friends();
    let mut journal = Journal::new();

    friends
        .send_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .accept_request("alice", "bob", &mut journal)
        .await
        .unwrap();
    friends
        .send_request("alice", "carol", &mut journal)
        .await
        .unwrap();
    friends
        .send_request("dave", "alice", &mut journal)
        .await
        .unwrap();
    journal.commit();

    let statuses = friends
        .statuses_of("alice", ["alice", "bob", "carol", "dave", "erin", "bob"])
        .await
        .unwrap();

    assert_eq!(statuses.len(), 5);
    assert_eq!(statuses["alice"], FriendStatus::SelfUser);
    assert_eq!(statuses["bob"], FriendStatus::Mutual);
    assert_eq!(statuses["carol"], FriendStatus::RequestedByMe);
    assert_eq!(statuses["dave"], FriendStatus::RequestedOfMe);
    assert_eq!(statuses["erin"], FriendStatus::None);

    let subscriptions = friends.pending_subscriptions_of("alice").await.unwrap();
    let subscribers = friends.pending_subscribers_of("alice").await.unwrap();
    let mutual = friends.friends_of("alice").await.unwrap();
    for (user, status) in &statuses {
        assert_eq!(
            *status == FriendStatus::RequestedByMe,
            subscriptions.contains(user)
        );
        assert_eq!(*status == FriendStatus::RequestedOfMe, subscribers.contains(user));
        assert_eq!(*status == FriendStatus::Mutual, mutual.contains(user));
    }
}

#[tokio::test]
async fn statuses_of_nobody_is_empty() {
    let (engine, _db) = engine_with_db().await;
    let statuses = engine
        .friends()
        .statuses_of("alice", Vec::<String>::new())
        .await
        .unwrap();
    assert!(statuses.is_empty());
}
