use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CollaborationStatus, Engine, EngineError, TripNewCmd};
use migration::MigratorTrait;

async fn engine_with_users(users: &[(&str, &str)]) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, email) in users {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, email) VALUES (?, ?, ?)",
            vec![(*username).into(), "password".into(), (*email).into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, d, 12, 0, 0).unwrap()
}

async fn trip_owned_by_alice(engine: &Engine) -> String {
    engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string()
}

#[tokio::test]
async fn owner_invites_by_email() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let entry = engine
        .invite_collaborator(&trip_id, "bob@example.com", 20_000, "alice")
        .await
        .unwrap();

    assert_eq!(entry.user.username, "bob");
    assert_eq!(entry.contribution_minor, 20_000);
    assert_eq!(entry.status, CollaborationStatus::Pending);
    assert!(!entry.has_paid);
}

#[tokio::test]
async fn invite_clamps_negative_contribution() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let entry = engine
        .invite_collaborator(&trip_id, "bob@example.com", -500, "alice")
        .await
        .unwrap();
    assert_eq!(entry.contribution_minor, 0);
}

#[tokio::test]
async fn invite_requires_known_email() {
    let (engine, _db) = engine_with_users(&[("alice", "alice@example.com")]).await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let err = engine
        .invite_collaborator(&trip_id, "nobody@example.com", 0, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("user not found with this email".to_string())
    );
}

#[tokio::test]
async fn owner_cannot_invite_themselves() {
    let (engine, _db) = engine_with_users(&[("alice", "alice@example.com")]).await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let err = engine
        .invite_collaborator(&trip_id, "alice@example.com", 0, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("you cannot collaborate with yourself".to_string())
    );
}

#[tokio::test]
async fn duplicate_invite_reports_current_status() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap();
    let err = engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("user is already a collaborator with status: pending".to_string())
    );

    engine
        .respond_invitation(&trip_id, CollaborationStatus::Declined, "bob")
        .await
        .unwrap();
    let err = engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey(
            "user is already a collaborator with status: declined".to_string()
        )
    );
}

#[tokio::test]
async fn only_owner_invites() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
        ("carol", "carol@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let err = engine
        .invite_collaborator(&trip_id, "carol@example.com", 0, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("only the trip owner can do this".to_string())
    );
}

#[tokio::test]
async fn invitation_is_answered_exactly_once() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap();

    let entry = engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap();
    assert_eq!(entry.status, CollaborationStatus::Accepted);

    let err = engine
        .respond_invitation(&trip_id, CollaborationStatus::Declined, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey(
            "invitation already answered with status: accepted".to_string()
        )
    );
}

#[tokio::test]
async fn respond_without_invitation_is_not_found() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let err = engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("no collaboration request found for this user".to_string())
    );
}

#[tokio::test]
async fn respond_rejects_pending_status() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap();

    let err = engine
        .respond_invitation(&trip_id, CollaborationStatus::Pending, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("status must be 'accepted' or 'declined'".to_string())
    );
}

#[tokio::test]
async fn pending_invitations_carry_trip_and_owner() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 20_000, "alice")
        .await
        .unwrap();

    let invitations = engine.list_pending_invitations("bob").await.unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].trip.id.to_string(), trip_id);
    assert_eq!(invitations[0].owner.username, "alice");
    assert_eq!(invitations[0].contribution_minor, 20_000);

    engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap();
    assert!(engine.list_pending_invitations("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn collaborator_list_includes_every_status() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
        ("carol", "carol@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 20_000, "alice")
        .await
        .unwrap();
    engine
        .invite_collaborator(&trip_id, "carol@example.com", 0, "alice")
        .await
        .unwrap();
    engine
        .respond_invitation(&trip_id, CollaborationStatus::Declined, "carol")
        .await
        .unwrap();

    let entries = engine.list_collaborators(&trip_id, "alice").await.unwrap();
    assert_eq!(entries.len(), 2);
    let carol = entries.iter().find(|e| e.user.username == "carol").unwrap();
    assert_eq!(carol.status, CollaborationStatus::Declined);
}

#[tokio::test]
async fn collaborator_list_hidden_from_strangers() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;

    let err = engine
        .list_collaborators(&trip_id, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn owner_removes_collaborator() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap();
    engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap();

    engine
        .remove_collaborator(&trip_id, "bob", "alice")
        .await
        .unwrap();

    // access is gone with the entry
    let err = engine.trip(&trip_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .remove_collaborator(&trip_id, "bob", "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("collaborator not exists".to_string())
    );
}

#[tokio::test]
async fn remove_collaborator_is_owner_only() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
        ("carol", "carol@example.com"),
    ])
    .await;
    let trip_id = trip_owned_by_alice(&engine).await;
    engine
        .invite_collaborator(&trip_id, "carol@example.com", 0, "alice")
        .await
        .unwrap();

    let err = engine
        .remove_collaborator(&trip_id, "carol", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
