//! The `Trip` is the aggregate everything else hangs off: expenses reference
//! it, collaborations are embedded in it. A user can own multiple trips.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A planned or ongoing trip with a budget, owned by a single user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub destination: String,
    pub purpose: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Budget in minor units (cents). Never negative.
    pub budget_minor: i64,
    pub notes: Option<String>,
    /// Username of the owner. Only the owner may mutate trip metadata or
    /// collaborator membership beyond a collaborator's own response.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        destination: String,
        purpose: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        budget_minor: i64,
        notes: Option<String>,
        user_id: &str,
    ) -> ResultEngine<Self> {
        validate_dates(start_date, end_date)?;
        validate_budget(budget_minor)?;
        Ok(Self {
            id: Uuid::new_v4(),
            destination,
            purpose,
            start_date,
            end_date,
            budget_minor,
            notes,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        })
    }
}

pub(crate) fn validate_dates(
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> ResultEngine<()> {
    if end_date < start_date {
        return Err(EngineError::InvalidInput(
            "end date cannot be before start date".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_budget(budget_minor: i64) -> ResultEngine<()> {
    if budget_minor < 0 {
        return Err(EngineError::InvalidInput(
            "budget must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub destination: String,
    pub purpose: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub budget_minor: i64,
    pub notes: Option<String>,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::collaborations::Entity")]
    Collaborations,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::collaborations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collaborations.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Trip> for ActiveModel {
    fn from(trip: &Trip) -> Self {
        Self {
            id: ActiveValue::Set(trip.id.to_string()),
            destination: ActiveValue::Set(trip.destination.clone()),
            purpose: ActiveValue::Set(trip.purpose.clone()),
            start_date: ActiveValue::Set(trip.start_date),
            end_date: ActiveValue::Set(trip.end_date),
            budget_minor: ActiveValue::Set(trip.budget_minor),
            notes: ActiveValue::Set(trip.notes.clone()),
            user_id: ActiveValue::Set(trip.user_id.clone()),
            created_at: ActiveValue::Set(trip.created_at),
        }
    }
}

impl TryFrom<Model> for Trip {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("trip not exists".to_string()))?,
            destination: model.destination,
            purpose: model.purpose,
            start_date: model.start_date,
            end_date: model.end_date,
            budget_minor: model.budget_minor,
            notes: model.notes,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}
