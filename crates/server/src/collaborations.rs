//! Collaboration endpoints: invitations and the collaborator list.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::collaboration::{InvitationAnswer, InviteCollaborator, RespondInvitation};
use engine::{Collaboration, CollaborationStatus, CollaboratorEntry, PendingInvitation};

use crate::{ServerError, server::ServerState, user};

pub async fn invite(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<InviteCollaborator>,
) -> Result<(StatusCode, Json<CollaboratorEntry>), ServerError> {
    let entry = state
        .engine
        .invite_collaborator(
            &trip_id,
            &payload.email,
            payload.contribution_minor.unwrap_or(0),
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn respond(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<RespondInvitation>,
) -> Result<Json<Collaboration>, ServerError> {
    let status = match payload.status {
        InvitationAnswer::Accepted => CollaborationStatus::Accepted,
        InvitationAnswer::Declined => CollaborationStatus::Declined,
    };
    let entry = state
        .engine
        .respond_invitation(&trip_id, status, &user.username)
        .await?;
    Ok(Json(entry))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((trip_id, username)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_collaborator(&trip_id, &username, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pending_invitations(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingInvitation>>, ServerError> {
    let invitations = state.engine.list_pending_invitations(&user.username).await?;
    Ok(Json(invitations))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<CollaboratorEntry>>, ServerError> {
    let entries = state
        .engine
        .list_collaborators(&trip_id, &user.username)
        .await?;
    Ok(Json(entries))
}
