//! Settlement operations: the two directions money moves between a trip
//! owner and a collaborator.
//!
//! Direction A: a collaborator pays the contribution they pledged.
//! Direction B: the owner reimburses an expense a collaborator paid on the
//! trip's behalf.
//!
//! Neither direction nets against the other; each is an explicit user action.

use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    Collaboration, CollaborationExpenseCmd, EngineError, Expense, ResultEngine, collaborations,
    expenses,
};

use super::{
    Engine, expenses::ExpenseWithPayer, normalize_optional_text, normalize_required_text,
    parse_expense_uuid, parse_trip_uuid, with_tx,
};

/// Default category for a collaboration expense when the caller sends none.
const COLLABORATION_EXPENSE_CATEGORY: &str = "Collaboration Expense";

impl Engine {
    /// Direction A: pay the pledged contribution (accepted collaborator
    /// only).
    ///
    /// A contribution is paid at most once; retrying fails with
    /// `AlreadyPaid`. The audit expense and the `has_paid` flip happen inside
    /// one DB transaction, audit record first, so a failure between the two
    /// writes can only leave an orphan audit row, never an unaccounted paid
    /// flag.
    pub async fn pay_contribution(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Collaboration> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            let (_, entry_model) = self
                .require_accepted_collaborator(&db_tx, trip_id, user_id)
                .await?;
            let mut entry = Collaboration::try_from(entry_model)?;

            let now = Utc::now();
            if entry.contribution_minor > 0 {
                let audit =
                    Expense::contribution_audit(trip_id, user_id, entry.contribution_minor, now)?;
                let audit_model: expenses::ActiveModel = (&audit).into();
                audit_model.insert(&db_tx).await?;
            }

            entry.mark_paid(now)?;
            let active: collaborations::ActiveModel = (&entry).into();
            active.update(&db_tx).await?;
            Ok(entry)
        })
    }

    /// Direction B: record an expense the collaborator paid and the owner
    /// must reimburse (accepted collaborator only).
    pub async fn record_collaboration_expense(
        &self,
        cmd: CollaborationExpenseCmd,
    ) -> ResultEngine<ExpenseWithPayer> {
        parse_trip_uuid(&cmd.trip_id)?;
        let description = normalize_required_text(&cmd.description, "description")?;
        with_tx!(self, |db_tx| {
            let (trip, _) = self
                .require_accepted_collaborator(&db_tx, &cmd.trip_id, &cmd.user_id)
                .await?;

            let category = normalize_optional_text(cmd.category.as_deref())
                .unwrap_or_else(|| COLLABORATION_EXPENSE_CATEGORY.to_string());
            let expense = Expense::collaboration(
                &cmd.trip_id,
                &cmd.user_id,
                &trip.user_id,
                cmd.amount_minor,
                category,
                description,
                cmd.date.unwrap_or_else(Utc::now),
            )?;
            let active: expenses::ActiveModel = (&expense).into();
            active.insert(&db_tx).await?;

            let payer = self.user_ref(&db_tx, &cmd.user_id).await?;
            Ok(ExpenseWithPayer { expense, payer })
        })
    }

    /// Unpaid collaboration expenses billed to the trip owner (owner only).
    pub async fn list_pending_reimbursements(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<ExpenseWithPayer>> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;

            let rows: Vec<expenses::Model> = expenses::Entity::find()
                .filter(expenses::Column::TripId.eq(trip_id.to_string()))
                .filter(expenses::Column::ForUserId.eq(user_id.to_string()))
                .filter(expenses::Column::IsCollaborationExpense.eq(true))
                .filter(expenses::Column::IsPaid.eq(false))
                .all(&db_tx)
                .await?;

            let mut pending = Vec::with_capacity(rows.len());
            for model in rows {
                let payer = self.user_ref(&db_tx, &model.user_id).await?;
                pending.push(ExpenseWithPayer {
                    expense: Expense::try_from(model)?,
                    payer,
                });
            }
            Ok(pending)
        })
    }

    /// Direction B: settle a reimbursement as its designated debtor.
    ///
    /// Only the user named in `for_user_id` may settle, and only once.
    pub async fn settle_reimbursement(
        &self,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        parse_expense_uuid(expense_id)?;
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

            if model.for_user_id.as_deref() != Some(user_id) {
                return Err(EngineError::Forbidden(
                    "you are not authorized to pay this expense".to_string(),
                ));
            }

            let mut expense = Expense::try_from(model)?;
            expense.settle(Utc::now())?;

            let active: expenses::ActiveModel = (&expense).into();
            active.update(&db_tx).await?;
            Ok(expense)
        })
    }
}
