use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Expense, ExpenseNewCmd, ResultEngine, expenses, users::UserRef};

use super::{Engine, normalize_optional_text, normalize_required_text, parse_trip_uuid, with_tx};

/// An expense with the payer's identity resolved, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseWithPayer {
    pub expense: Expense,
    pub payer: UserRef,
}

impl Engine {
    /// Record an ordinary personal expense on a trip the user can see.
    pub async fn new_expense(&self, cmd: ExpenseNewCmd) -> ResultEngine<Expense> {
        parse_trip_uuid(&cmd.trip_id)?;
        let category = normalize_required_text(&cmd.category, "category")?;
        let expense = Expense::new(
            &cmd.trip_id,
            &cmd.user_id,
            cmd.amount_minor,
            category,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.date.unwrap_or_else(Utc::now),
        )?;
        with_tx!(self, |db_tx| {
            self.require_trip_read(&db_tx, &cmd.trip_id, &cmd.user_id)
                .await?;
            let active: expenses::ActiveModel = (&expense).into();
            active.insert(&db_tx).await?;
            Ok(expense)
        })
    }

    /// All expenses of a trip, newest first, with payer identities resolved.
    ///
    /// Visible to the owner and to accepted collaborators.
    pub async fn list_trip_expenses(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<ExpenseWithPayer>> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            self.require_trip_read(&db_tx, trip_id, user_id).await?;

            let rows: Vec<expenses::Model> = expenses::Entity::find()
                .filter(expenses::Column::TripId.eq(trip_id.to_string()))
                .order_by_desc(expenses::Column::Date)
                .all(&db_tx)
                .await?;

            let mut entries = Vec::with_capacity(rows.len());
            for model in rows {
                let payer = self.user_ref(&db_tx, &model.user_id).await?;
                entries.push(ExpenseWithPayer {
                    expense: Expense::try_from(model)?,
                    payer,
                });
            }
            Ok(entries)
        })
    }
}
