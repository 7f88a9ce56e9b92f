use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{
    CollaborationStatus, EngineError, ResultEngine, collaborations, trips, users, users::UserRef,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_trip_by_id(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<Option<trips::Model>> {
        trips::Entity::find_by_id(trip_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_trip_by_id(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<trips::Model> {
        self.find_trip_by_id(db, trip_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("trip not exists".to_string()))
    }

    /// The trip must exist and the acting user must be its owner.
    pub(super) async fn require_trip_owner(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let model = self.require_trip_by_id(db, trip_id).await?;
        if model.user_id != user_id {
            return Err(EngineError::Forbidden(
                "only the trip owner can do this".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn collaboration_entry(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Option<collaborations::Model>> {
        collaborations::Entity::find_by_id((trip_id.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn is_accepted_collaborator(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let entry = self.collaboration_entry(db, trip_id, user_id).await?;
        Ok(entry.is_some_and(|e| e.status == CollaborationStatus::Accepted.as_str()))
    }

    /// The trip must exist and the acting user must hold an accepted
    /// collaboration entry on it.
    pub(super) async fn require_accepted_collaborator(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<(trips::Model, collaborations::Model)> {
        let trip = self.require_trip_by_id(db, trip_id).await?;
        let entry = self
            .collaboration_entry(db, trip_id, user_id)
            .await?
            .filter(|e| e.status == CollaborationStatus::Accepted.as_str())
            .ok_or_else(|| {
                EngineError::Forbidden(
                    "you are not an accepted collaborator on this trip".to_string(),
                )
            })?;
        Ok((trip, entry))
    }

    /// The trip must exist and the acting user must be the owner or an
    /// accepted collaborator.
    pub(super) async fn require_trip_read(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let model = self.require_trip_by_id(db, trip_id).await?;
        if model.user_id == user_id {
            return Ok(model);
        }
        if self.is_accepted_collaborator(db, trip_id, user_id).await? {
            return Ok(model);
        }
        Err(EngineError::Forbidden(
            "you don't have permission to view this trip".to_string(),
        ))
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Resolve an invitee by email (the user directory interface).
    pub(super) async fn require_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not found with this email".to_string()))
    }

    pub(super) async fn user_ref(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<UserRef> {
        Ok(self.require_user(db, username).await?.into())
    }
}
