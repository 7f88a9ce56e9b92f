//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};

/// Create a new trip.
#[derive(Clone, Debug)]
pub struct TripNewCmd {
    pub destination: String,
    pub purpose: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget_minor: i64,
    pub notes: Option<String>,
    pub user_id: String,
}

impl TripNewCmd {
    #[must_use]
    pub fn new(
        destination: impl Into<String>,
        purpose: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            purpose: purpose.into(),
            start_date,
            end_date,
            budget_minor: 0,
            notes: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn budget_minor(mut self, budget_minor: i64) -> Self {
        self.budget_minor = budget_minor;
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Update trip metadata (owner only). `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct TripUpdateCmd {
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget_minor: Option<i64>,
    pub notes: Option<String>,
}

/// Record an ordinary personal expense on a trip.
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub trip_id: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl ExpenseNewCmd {
    #[must_use]
    pub fn new(
        trip_id: impl Into<String>,
        user_id: impl Into<String>,
        amount_minor: i64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            amount_minor,
            category: category.into(),
            description: None,
            date: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Record an expense a collaborator paid on the trip's behalf; the trip owner
/// becomes the debtor.
#[derive(Clone, Debug)]
pub struct CollaborationExpenseCmd {
    pub trip_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl CollaborationExpenseCmd {
    #[must_use]
    pub fn new(
        trip_id: impl Into<String>,
        user_id: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            amount_minor,
            description: description.into(),
            category: None,
            date: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
