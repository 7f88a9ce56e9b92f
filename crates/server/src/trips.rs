//! Trip CRUD endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use api_types::trip::{TripNew, TripUpdate};
use engine::{Trip, TripNewCmd, TripUpdateCmd};

use crate::{ServerError, server::ServerState, user};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TripNew>,
) -> Result<(StatusCode, Json<Trip>), ServerError> {
    let mut cmd = TripNewCmd::new(
        payload.destination,
        payload.purpose,
        payload.start_date,
        payload.end_date,
        &user.username,
    );
    if let Some(budget_minor) = payload.budget_minor {
        cmd = cmd.budget_minor(budget_minor);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let trip = state.engine.new_trip(cmd).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Trip>>, ServerError> {
    let trips = state.engine.list_trips(&user.username).await?;
    Ok(Json(trips))
}

pub async fn get_one(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, ServerError> {
    let trip = state.engine.trip(&trip_id, &user.username).await?;
    Ok(Json(trip))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<TripUpdate>,
) -> Result<Json<Trip>, ServerError> {
    let cmd = TripUpdateCmd {
        destination: payload.destination,
        purpose: payload.purpose,
        start_date: payload.start_date,
        end_date: payload.end_date,
        budget_minor: payload.budget_minor,
        notes: payload.notes,
    };
    let trip = state
        .engine
        .update_trip(&trip_id, cmd, &user.username)
        .await?;
    Ok(Json(trip))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_trip(&trip_id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
