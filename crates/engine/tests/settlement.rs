use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CONTRIBUTION_CATEGORY, CollaborationExpenseCmd, CollaborationStatus, Engine, EngineError,
    ExpenseNewCmd, TripNewCmd,
};
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

/// Alice owns a trip; bob holds an accepted entry with a 20 000 pledge.
async fn trip_with_accepted_bob(engine: &Engine) -> String {
    let trip_id = engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string();
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 20_000, "alice")
        .await
        .unwrap();
    engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap();
    trip_id
}

#[tokio::test]
async fn pay_contribution_writes_audit_and_flips_flag() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    let entry = engine.pay_contribution(&trip_id, "bob").await.unwrap();
    assert!(entry.has_paid);
    assert!(entry.payment_date.is_some());

    let expenses = engine.list_trip_expenses(&trip_id, "alice").await.unwrap();
    assert_eq!(expenses.len(), 1);
    let audit = &expenses[0].expense;
    assert_eq!(audit.category, CONTRIBUTION_CATEGORY);
    assert_eq!(audit.amount_minor, 20_000);
    assert_eq!(audit.user_id, "bob");
    assert!(audit.is_paid);
    assert!(!audit.is_collaboration_expense);
    assert_eq!(audit.for_user_id, None);
}

#[tokio::test]
async fn pay_contribution_is_not_repeatable() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    engine.pay_contribution(&trip_id, "bob").await.unwrap();
    let err = engine.pay_contribution(&trip_id, "bob").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::AlreadyPaid("contribution already paid".to_string())
    );

    // no second audit record
    let expenses = engine.list_trip_expenses(&trip_id, "alice").await.unwrap();
    assert_eq!(expenses.len(), 1);
}

#[tokio::test]
async fn pay_contribution_requires_accepted_entry() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
        ("carol", "carol@example.com"),
    ])
    .await;
    let trip_id = engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string();
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 20_000, "alice")
        .await
        .unwrap();

    // pending invitee
    let err = engine.pay_contribution(&trip_id, "bob").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("you are not an accepted collaborator on this trip".to_string())
    );

    // stranger
    let err = engine.pay_contribution(&trip_id, "carol").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn zero_pledge_pays_without_audit_record() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string();
    engine
        .invite_collaborator(&trip_id, "bob@example.com", 0, "alice")
        .await
        .unwrap();
    engine
        .respond_invitation(&trip_id, CollaborationStatus::Accepted, "bob")
        .await
        .unwrap();

    let entry = engine.pay_contribution(&trip_id, "bob").await.unwrap();
    assert!(entry.has_paid);
    assert!(engine
        .list_trip_expenses(&trip_id, "alice")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn collaboration_expense_bills_the_owner() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    let recorded = engine
        .record_collaboration_expense(
            CollaborationExpenseCmd::new(&trip_id, "bob", 4_550, "airport taxi")
                .category("Transportation"),
        )
        .await
        .unwrap();

    assert_eq!(recorded.payer.username, "bob");
    let expense = &recorded.expense;
    assert!(expense.is_collaboration_expense);
    assert_eq!(expense.for_user_id.as_deref(), Some("alice"));
    assert_eq!(expense.category, "Transportation");
    assert!(!expense.is_paid);

    let pending = engine
        .list_pending_reimbursements(&trip_id, "alice")
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].expense.id, expense.id);
    assert_eq!(pending[0].payer.username, "bob");
}

#[tokio::test]
async fn collaboration_expense_defaults_category() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    let recorded = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(
            &trip_id, "bob", 4_550, "airport taxi",
        ))
        .await
        .unwrap();
    assert_eq!(recorded.expense.category, "Collaboration Expense");
}

#[tokio::test]
async fn collaboration_expense_requires_accepted_entry() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string();

    let err = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(
            &trip_id, "bob", 4_550, "airport taxi",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("you are not an accepted collaborator on this trip".to_string())
    );
}

#[tokio::test]
async fn collaboration_expense_requires_description_and_amount() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    let err = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(&trip_id, "bob", 4_550, "  "))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("description must not be empty".to_string())
    );

    let err = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(
            &trip_id, "bob", 0, "airport taxi",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("amount must be greater than zero".to_string())
    );
}

#[tokio::test]
async fn pending_reimbursements_are_owner_only() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    let err = engine
        .list_pending_reimbursements(&trip_id, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("only the trip owner can do this".to_string())
    );
}

#[tokio::test]
async fn settle_reimbursement_marks_paid_once() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;
    let recorded = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(
            &trip_id, "bob", 4_550, "airport taxi",
        ))
        .await
        .unwrap();
    let expense_id = recorded.expense.id.to_string();

    let settled = engine
        .settle_reimbursement(&expense_id, "alice")
        .await
        .unwrap();
    assert!(settled.is_paid);
    assert!(settled.payment_date.is_some());
    assert!(engine
        .list_pending_reimbursements(&trip_id, "alice")
        .await
        .unwrap()
        .is_empty());

    let err = engine
        .settle_reimbursement(&expense_id, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AlreadyPaid("expense already settled".to_string())
    );
}

#[tokio::test]
async fn settle_reimbursement_is_debtor_only() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;
    let recorded = engine
        .record_collaboration_expense(CollaborationExpenseCmd::new(
            &trip_id, "bob", 4_550, "airport taxi",
        ))
        .await
        .unwrap();
    let expense_id = recorded.expense.id.to_string();

    // not even the payer may settle
    let err = engine
        .settle_reimbursement(&expense_id, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("you are not authorized to pay this expense".to_string())
    );
}

#[tokio::test]
async fn settle_reimbursement_validates_id() {
    let (engine, _db) = engine_with_users(&[("alice", "alice@example.com")]).await;

    let err = engine
        .settle_reimbursement("not-a-uuid", "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("invalid expense id".to_string())
    );

    let missing = uuid::Uuid::new_v4().to_string();
    let err = engine
        .settle_reimbursement(&missing, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("expense not exists".to_string())
    );
}

#[tokio::test]
async fn personal_expense_visible_to_collaborators() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = trip_with_accepted_bob(&engine).await;

    engine
        .new_expense(ExpenseNewCmd::new(&trip_id, "alice", 3_000, "Meals").description("dinner"))
        .await
        .unwrap();
    engine
        .new_expense(ExpenseNewCmd::new(&trip_id, "bob", 1_200, "Meals"))
        .await
        .unwrap();

    let seen_by_bob = engine.list_trip_expenses(&trip_id, "bob").await.unwrap();
    assert_eq!(seen_by_bob.len(), 2);
    assert!(seen_by_bob.iter().any(|e| e.payer.username == "alice"));
}

#[tokio::test]
async fn stranger_cannot_record_personal_expense() {
    let (engine, _db) = engine_with_users(&[
        ("alice", "alice@example.com"),
        ("bob", "bob@example.com"),
    ])
    .await;
    let trip_id = engine
        .new_trip(TripNewCmd::new("Lisbon", "Conference", day(1), day(5), "alice"))
        .await
        .unwrap()
        .id
        .to_string();

    let err = engine
        .new_expense(ExpenseNewCmd::new(&trip_id, "bob", 3_000, "Meals"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
