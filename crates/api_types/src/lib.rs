//! Request bodies shared between the HTTP server and its clients.
//!
//! Response bodies serialize the engine's domain types directly; only the
//! shapes a client has to construct live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod trip {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripNew {
        pub destination: String,
        pub purpose: String,
        /// RFC3339 timestamps.
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        /// Budget in minor units (cents). Defaults to 0.
        pub budget_minor: Option<i64>,
        pub notes: Option<String>,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TripUpdate {
        pub destination: Option<String>,
        pub purpose: Option<String>,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
        pub budget_minor: Option<i64>,
        pub notes: Option<String>,
    }
}

pub mod collaboration {
    use super::*;

    /// Invite a user, resolved by email, to co-fund a trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InviteCollaborator {
        pub email: String,
        /// Pledged contribution in minor units; negative values are clamped
        /// to 0 server-side.
        pub contribution_minor: Option<i64>,
    }

    /// The two answers an invitee can give. `pending` is not an answer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvitationAnswer {
        Accepted,
        Declined,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RespondInvitation {
        pub status: InvitationAnswer,
    }
}

pub mod expense {
    use super::*;

    /// Ordinary personal expense on a trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// Minor units, must be > 0.
        pub amount_minor: i64,
        pub category: String,
        pub description: Option<String>,
        /// Defaults to now.
        pub date: Option<DateTime<Utc>>,
    }

    /// Expense a collaborator paid on the trip's behalf; the trip owner
    /// becomes the debtor.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CollaborationExpenseNew {
        /// Minor units, must be > 0.
        pub amount_minor: i64,
        pub description: String,
        pub category: Option<String>,
        pub date: Option<DateTime<Utc>>,
    }
}
