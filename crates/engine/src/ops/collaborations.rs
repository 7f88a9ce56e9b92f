use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Collaboration, CollaborationStatus, CollaboratorEntry, EngineError, ResultEngine, Trip,
    collaborations, trips, users::UserRef,
};

use super::{Engine, normalize_required_text, parse_trip_uuid, with_tx};

/// An outstanding invitation, shown in the invitee's inbox with the inviting
/// owner's identity attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvitation {
    pub trip: Trip,
    pub owner: UserRef,
    pub contribution_minor: i64,
}

impl Engine {
    /// Invite a user (resolved by email) to co-fund a trip (owner only).
    ///
    /// A user can hold at most one entry per trip; inviting them again fails
    /// with the existing entry's status in the message. A negative pledged
    /// contribution is clamped to zero rather than rejected.
    pub async fn invite_collaborator(
        &self,
        trip_id: &str,
        email: &str,
        contribution_minor: i64,
        user_id: &str,
    ) -> ResultEngine<CollaboratorEntry> {
        parse_trip_uuid(trip_id)?;
        let email = normalize_required_text(email, "email")?;
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let target = self.require_user_by_email(&db_tx, &email).await?;

            if target.username == trip.user_id {
                return Err(EngineError::InvalidInput(
                    "you cannot collaborate with yourself".to_string(),
                ));
            }

            if let Some(existing) = self
                .collaboration_entry(&db_tx, trip_id, &target.username)
                .await?
            {
                return Err(EngineError::ExistingKey(format!(
                    "user is already a collaborator with status: {}",
                    existing.status
                )));
            }

            let entry = Collaboration::new(trip_id, &target.username, contribution_minor);
            let active: collaborations::ActiveModel = (&entry).into();
            active.insert(&db_tx).await?;

            Ok(CollaboratorEntry::from_parts(entry, target.into()))
        })
    }

    /// Answer an invitation as the invited user.
    ///
    /// `status` must be `accepted` or `declined`. Both are terminal: once an
    /// invitation has been answered a further response fails with the current
    /// status in the message.
    pub async fn respond_invitation(
        &self,
        trip_id: &str,
        status: CollaborationStatus,
        user_id: &str,
    ) -> ResultEngine<Collaboration> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            self.require_trip_by_id(&db_tx, trip_id).await?;
            let model = self
                .collaboration_entry(&db_tx, trip_id, user_id)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(
                        "no collaboration request found for this user".to_string(),
                    )
                })?;

            let mut entry = Collaboration::try_from(model)?;
            entry.respond(status)?;

            let active: collaborations::ActiveModel = (&entry).into();
            active.update(&db_tx).await?;
            Ok(entry)
        })
    }

    /// Remove a collaborator entry (owner only).
    ///
    /// Deletes exactly that entry, whatever its status; already-created
    /// expense records are untouched.
    pub async fn remove_collaborator(
        &self,
        trip_id: &str,
        member_username: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            self.collaboration_entry(&db_tx, trip_id, member_username)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("collaborator not exists".to_string()))?;

            collaborations::Entity::delete_by_id((
                trip_id.to_string(),
                member_username.to_string(),
            ))
            .exec(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Trips where the user holds a pending invitation, with the inviting
    /// owner's identity resolved.
    pub async fn list_pending_invitations(
        &self,
        user_id: &str,
    ) -> ResultEngine<Vec<PendingInvitation>> {
        with_tx!(self, |db_tx| {
            let rows: Vec<(collaborations::Model, Option<trips::Model>)> =
                collaborations::Entity::find()
                    .filter(collaborations::Column::UserId.eq(user_id.to_string()))
                    .filter(
                        collaborations::Column::Status
                            .eq(CollaborationStatus::Pending.as_str().to_string()),
                    )
                    .find_also_related(trips::Entity)
                    .all(&db_tx)
                    .await?;

            let mut invitations = Vec::with_capacity(rows.len());
            for (entry, trip_model) in rows {
                let Some(trip_model) = trip_model else {
                    continue;
                };
                let owner = self.user_ref(&db_tx, &trip_model.user_id).await?;
                invitations.push(PendingInvitation {
                    trip: Trip::try_from(trip_model)?,
                    owner,
                    contribution_minor: entry.contribution_minor,
                });
            }
            Ok(invitations)
        })
    }

    /// Full collaborator list of a trip, identities resolved.
    ///
    /// Visible to the owner and to accepted collaborators; pending and
    /// declined entries are included.
    pub async fn list_collaborators(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<CollaboratorEntry>> {
        parse_trip_uuid(trip_id)?;
        with_tx!(self, |db_tx| {
            self.require_trip_read(&db_tx, trip_id, user_id).await?;

            let rows: Vec<collaborations::Model> = collaborations::Entity::find()
                .filter(collaborations::Column::TripId.eq(trip_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut entries = Vec::with_capacity(rows.len());
            for model in rows {
                let user = self.user_ref(&db_tx, &model.user_id).await?;
                entries.push(CollaboratorEntry::from_parts(
                    Collaboration::try_from(model)?,
                    user,
                ));
            }
            Ok(entries)
        })
    }
}
