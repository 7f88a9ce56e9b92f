//! Collaboration entries: one row per user invited to co-fund a trip.
//!
//! The entry is a small state machine. An invitation starts `pending` and is
//! answered exactly once, to `accepted` or `declined`; both are terminal.
//! `has_paid` can only flip to `true` while the entry is `accepted`, and it
//! never flips back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, users::UserRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    Pending,
    Accepted,
    Declined,
}

impl CollaborationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Accepted and declined are terminal for the invite instance.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }
}

impl TryFrom<&str> for CollaborationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(EngineError::InvalidInput(format!(
                "invalid collaboration status: {other}"
            ))),
        }
    }
}

/// A single collaborator entry on a trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub trip_id: String,
    pub user_id: String,
    /// Pledged contribution in minor units. Negative input is clamped to 0.
    pub contribution_minor: i64,
    pub status: CollaborationStatus,
    pub has_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Collaboration {
    pub fn new(trip_id: &str, user_id: &str, contribution_minor: i64) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            user_id: user_id.to_string(),
            contribution_minor: contribution_minor.max(0),
            status: CollaborationStatus::Pending,
            has_paid: false,
            payment_date: None,
        }
    }

    /// Answer the invitation. Only a pending entry can be answered; a second
    /// response is rejected with the current status in the message.
    pub fn respond(&mut self, status: CollaborationStatus) -> ResultEngine<()> {
        if !status.is_terminal() {
            return Err(EngineError::InvalidInput(
                "status must be 'accepted' or 'declined'".to_string(),
            ));
        }
        if self.status.is_terminal() {
            return Err(EngineError::ExistingKey(format!(
                "invitation already answered with status: {}",
                self.status.as_str()
            )));
        }
        self.status = status;
        Ok(())
    }

    /// Mark the pledged contribution as paid, exactly once.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != CollaborationStatus::Accepted {
            return Err(EngineError::Forbidden(
                "you are not an accepted collaborator on this trip".to_string(),
            ));
        }
        if self.has_paid {
            return Err(EngineError::AlreadyPaid(
                "contribution already paid".to_string(),
            ));
        }
        self.has_paid = true;
        self.payment_date = Some(now);
        Ok(())
    }
}

/// A collaboration entry with the member's identity resolved, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorEntry {
    pub user: UserRef,
    pub contribution_minor: i64,
    pub status: CollaborationStatus,
    pub has_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

impl CollaboratorEntry {
    pub(crate) fn from_parts(entry: Collaboration, user: UserRef) -> Self {
        Self {
            user,
            contribution_minor: entry.contribution_minor,
            status: entry.status,
            has_paid: entry.has_paid,
            payment_date: entry.payment_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "collaborations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub trip_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub contribution_minor: i64,
    pub status: String,
    pub has_paid: bool,
    pub payment_date: Option<DateTimeUtc>,
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

impl From<&Collaboration> for ActiveModel {
    fn from(entry: &Collaboration) -> Self {
        Self {
            trip_id: ActiveValue::Set(entry.trip_id.clone()),
            user_id: ActiveValue::Set(entry.user_id.clone()),
            contribution_minor: ActiveValue::Set(entry.contribution_minor),
            status: ActiveValue::Set(entry.status.as_str().to_string()),
            has_paid: ActiveValue::Set(entry.has_paid),
            payment_date: ActiveValue::Set(entry.payment_date),
        }
    }
}

impl TryFrom<Model> for Collaboration {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            trip_id: model.trip_id,
            user_id: model.user_id,
            contribution_minor: model.contribution_minor,
            status: CollaborationStatus::try_from(model.status.as_str())?,
            has_paid: model.has_paid,
            payment_date: model.payment_date,
        })
    }
}
