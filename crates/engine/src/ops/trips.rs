use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QuerySelect, Statement, TransactionTrait, prelude::*,
};

use crate::{
    CollaborationStatus, EngineError, ResultEngine, Trip, TripNewCmd, TripUpdateCmd,
    collaborations, trips,
};

use super::{Engine, normalize_optional_text, normalize_required_text, parse_trip_uuid, with_tx};

impl Engine {
    /// Create a new trip owned by `cmd.user_id`, with an empty collaborator
    /// list.
    pub async fn new_trip(&self, cmd: TripNewCmd) -> ResultEngine<Trip> {
        let destination = normalize_required_text(&cmd.destination, "destination")?;
        let purpose = normalize_required_text(&cmd.purpose, "purpose")?;
        let trip = Trip::new(
            destination,
            purpose,
            cmd.start_date,
            cmd.end_date,
            cmd.budget_minor,
            normalize_optional_text(cmd.notes.as_deref()),
            &cmd.user_id,
        )?;
        let trip_model: trips::ActiveModel = (&trip).into();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            trip_model.insert(&db_tx).await?;
            Ok(trip)
        })
    }

    /// Return a trip the user may read (owner or accepted collaborator).
    pub async fn trip(&self, trip_id: &str, user_id: &str) -> ResultEngine<Trip> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            Trip::try_from(model)
        })
    }

    /// All trips the user owns plus the ones where they are an accepted
    /// collaborator, newest start date first.
    pub async fn list_trips(&self, user_id: &str) -> ResultEngine<Vec<Trip>> {
        with_tx!(self, |db_tx| {
            let owned: Vec<trips::Model> = trips::Entity::find()
                .filter(trips::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;

            let collaborative: Vec<trips::Model> = trips::Entity::find()
                .join(JoinType::InnerJoin, trips::Relation::Collaborations.def())
                .filter(collaborations::Column::UserId.eq(user_id.to_string()))
                .filter(
                    collaborations::Column::Status
                        .eq(CollaborationStatus::Accepted.as_str().to_string()),
                )
                .all(&db_tx)
                .await?;

            let mut trips = Vec::with_capacity(owned.len() + collaborative.len());
            for model in owned.into_iter().chain(collaborative) {
                trips.push(Trip::try_from(model)?);
            }
            trips.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            Ok(trips)
        })
    }

    /// Update trip metadata (owner only). Dates and budget are re-validated
    /// against the resulting state, not just the provided fields.
    pub async fn update_trip(
        &self,
        trip_id: &str,
        cmd: TripUpdateCmd,
        user_id: &str,
    ) -> ResultEngine<Trip> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_trip_owner(&db_tx, trip_id, user_id).await?;

            let start_date = cmd.start_date.unwrap_or(model.start_date);
            let end_date = cmd.end_date.unwrap_or(model.end_date);
            trips::validate_dates(start_date, end_date)?;
            let budget_minor = cmd.budget_minor.unwrap_or(model.budget_minor);
            trips::validate_budget(budget_minor)?;

            let mut active: trips::ActiveModel = model.into();
            if let Some(destination) = cmd.destination {
                active.destination =
                    ActiveValue::Set(normalize_required_text(&destination, "destination")?);
            }
            if let Some(purpose) = cmd.purpose {
                active.purpose = ActiveValue::Set(normalize_required_text(&purpose, "purpose")?);
            }
            active.start_date = ActiveValue::Set(start_date);
            active.end_date = ActiveValue::Set(end_date);
            active.budget_minor = ActiveValue::Set(budget_minor);
            if cmd.notes.is_some() {
                active.notes = ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref()));
            }

            let updated = active.update(&db_tx).await?;
            Trip::try_from(updated)
        })
    }

    /// Delete a trip (owner only) and everything referencing it.
    ///
    /// Expenses and collaborations are removed explicitly inside the same DB
    /// transaction, so a trip deletion can never leave orphan records.
    pub async fn delete_trip(&self, trip_id: &str, user_id: &str) -> ResultEngine<()> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let backend = self.database.get_database_backend();

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE trip_id = ?;",
                    vec![trip.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM collaborations WHERE trip_id = ?;",
                    vec![trip.id.clone().into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM trips WHERE id = ?;",
                    vec![trip.id.into()],
                ))
                .await?;

            Ok(())
        })
    }

    /// Trips ending today or later that the user can see, soonest first.
    pub async fn list_active_trips(&self, user_id: &str) -> ResultEngine<Vec<Trip>> {
        let now = chrono::Utc::now();
        let mut trips = self.list_trips(user_id).await?;
        trips.retain(|t| t.end_date >= now);
        trips.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(trips)
    }
}
