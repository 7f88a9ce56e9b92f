//! Ordinary expense endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::expense::ExpenseNew;
use engine::{Expense, ExpenseNewCmd, ExpenseWithPayer};

use crate::{ServerError, server::ServerState, user};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let mut cmd = ExpenseNewCmd::new(
        &trip_id,
        &user.username,
        payload.amount_minor,
        payload.category,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = payload.date {
        cmd = cmd.date(date);
    }

    let expense = state.engine.new_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<ExpenseWithPayer>>, ServerError> {
    let expenses = state
        .engine
        .list_trip_expenses(&trip_id, &user.username)
        .await?;
    Ok(Json(expenses))
}
