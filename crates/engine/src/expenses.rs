//! Expense records.
//!
//! An expense always references a trip and the user who paid it. The
//! collaboration subtype additionally carries `for_user_id`, the user who has
//! to reimburse the payer; it is the unit the settlement flow marks as paid.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Category used for the audit record written when a collaborator pays their
/// pledged contribution.
pub const CONTRIBUTION_CATEGORY: &str = "Collaboration Payment";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: String,
    /// Username of the user who incurred/recorded the expense.
    pub user_id: String,
    /// Amount in minor units, always > 0.
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub is_collaboration_expense: bool,
    /// Set only on collaboration expenses: the user who must reimburse.
    pub for_user_id: Option<String>,
    pub is_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Creates an ordinary personal expense.
    pub fn new(
        trip_id: &str,
        user_id: &str,
        amount_minor: i64,
        category: String,
        description: Option<String>,
        date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            trip_id: trip_id.to_string(),
            user_id: user_id.to_string(),
            amount_minor,
            category,
            description,
            date,
            is_collaboration_expense: false,
            for_user_id: None,
            is_paid: false,
            payment_date: None,
            created_at: Utc::now(),
        })
    }

    /// Creates a collaboration expense: paid by `user_id`, to be reimbursed
    /// by `for_user_id`.
    pub fn collaboration(
        trip_id: &str,
        user_id: &str,
        for_user_id: &str,
        amount_minor: i64,
        category: String,
        description: String,
        date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if description.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "description must not be empty".to_string(),
            ));
        }
        if for_user_id == user_id {
            return Err(EngineError::InvalidInput(
                "a collaboration expense cannot be billed to its payer".to_string(),
            ));
        }
        let mut expense = Self::new(
            trip_id,
            user_id,
            amount_minor,
            category,
            Some(description),
            date,
        )?;
        expense.is_collaboration_expense = true;
        expense.for_user_id = Some(for_user_id.to_string());
        Ok(expense)
    }

    /// Creates the audit record for a paid contribution: an ordinary expense
    /// that is already settled.
    pub fn contribution_audit(
        trip_id: &str,
        payer: &str,
        amount_minor: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let mut expense = Self::new(
            trip_id,
            payer,
            amount_minor,
            CONTRIBUTION_CATEGORY.to_string(),
            Some(format!("Contribution payment from {payer}")),
            now,
        )?;
        expense.is_paid = true;
        expense.payment_date = Some(now);
        Ok(expense)
    }

    /// Marks the reimbursement as settled, exactly once.
    pub fn settle(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.is_paid {
            return Err(EngineError::AlreadyPaid(
                "expense already settled".to_string(),
            ));
        }
        self.is_paid = true;
        self.payment_date = Some(now);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub date: DateTimeUtc,
    pub is_collaboration_expense: bool,
    pub for_user_id: Option<String>,
    pub is_paid: bool,
    pub payment_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trips,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            trip_id: ActiveValue::Set(expense.trip_id.clone()),
            user_id: ActiveValue::Set(expense.user_id.clone()),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            category: ActiveValue::Set(expense.category.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            date: ActiveValue::Set(expense.date),
            is_collaboration_expense: ActiveValue::Set(expense.is_collaboration_expense),
            for_user_id: ActiveValue::Set(expense.for_user_id.clone()),
            is_paid: ActiveValue::Set(expense.is_paid),
            payment_date: ActiveValue::Set(expense.payment_date),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            trip_id: model.trip_id,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            category: model.category,
            description: model.description,
            date: model.date,
            is_collaboration_expense: model.is_collaboration_expense,
            for_user_id: model.for_user_id,
            is_paid: model.is_paid,
            payment_date: model.payment_date,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amount() {
        let err = Expense::new(
            "t",
            "bob",
            0,
            "Transportation".to_string(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("amount must be greater than zero".to_string())
        );
    }

    #[test]
    fn collaboration_requires_distinct_payer_and_debtor() {
        let err = Expense::collaboration(
            "t",
            "bob",
            "bob",
            4550,
            "Transportation".to_string(),
            "taxi".to_string(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn collaboration_requires_description() {
        let err = Expense::collaboration(
            "t",
            "bob",
            "alice",
            4550,
            "Transportation".to_string(),
            "  ".to_string(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("description must not be empty".to_string())
        );
    }

    #[test]
    fn contribution_audit_is_settled_ordinary_expense() {
        let expense = Expense::contribution_audit("t", "bob", 20_000, Utc::now()).unwrap();
        assert!(expense.is_paid);
        assert!(!expense.is_collaboration_expense);
        assert_eq!(expense.for_user_id, None);
        assert_eq!(expense.category, CONTRIBUTION_CATEGORY);
    }

    #[test]
    fn settle_is_not_repeatable() {
        let mut expense = Expense::collaboration(
            "t",
            "bob",
            "alice",
            4550,
            "Transportation".to_string(),
            "taxi".to_string(),
            Utc::now(),
        )
        .unwrap();
        expense.settle(Utc::now()).unwrap();
        let err = expense.settle(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::AlreadyPaid("expense already settled".to_string())
        );
    }
}
