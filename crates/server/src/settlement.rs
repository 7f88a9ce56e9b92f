//! Settlement endpoints: contribution payment and reimbursements.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::expense::CollaborationExpenseNew;
use engine::{Collaboration, CollaborationExpenseCmd, Expense, ExpenseWithPayer};

use crate::{ServerError, server::ServerState, user};

pub async fn pay_contribution(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Collaboration>, ServerError> {
    let entry = state
        .engine
        .pay_contribution(&trip_id, &user.username)
        .await?;
    Ok(Json(entry))
}

pub async fn record_collaboration_expense(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<CollaborationExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseWithPayer>), ServerError> {
    let mut cmd = CollaborationExpenseCmd::new(
        &trip_id,
        &user.username,
        payload.amount_minor,
        payload.description,
    );
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(date) = payload.date {
        cmd = cmd.date(date);
    }

    let recorded = state.engine.record_collaboration_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn pending_reimbursements(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<ExpenseWithPayer>>, ServerError> {
    let pending = state
        .engine
        .list_pending_reimbursements(&trip_id, &user.username)
        .await?;
    Ok(Json(pending))
}

pub async fn settle_reimbursement(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<Json<Expense>, ServerError> {
    let expense = state
        .engine
        .settle_reimbursement(&expense_id, &user.username)
        .await?;
    Ok(Json(expense))
}
