use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{collaborations, expenses, settlement, trips, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Build the application router. Exposed so tests can drive it with
/// `tower::ServiceExt::oneshot` without binding a socket.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/trips", post(trips::create).get(trips::list))
        .route(
            "/trips/{trip_id}",
            get(trips::get_one)
                .patch(trips::update)
                .delete(trips::delete),
        )
        .route(
            "/trips/{trip_id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route("/invitations", get(collaborations::pending_invitations))
        .route(
            "/trips/{trip_id}/collaborators",
            get(collaborations::list).post(collaborations::invite),
        )
        .route(
            "/trips/{trip_id}/collaborators/respond",
            patch(collaborations::respond),
        )
        .route(
            "/trips/{trip_id}/collaborators/{username}",
            delete(collaborations::remove),
        )
        .route(
            "/trips/{trip_id}/contribution/pay",
            post(settlement::pay_contribution),
        )
        .route(
            "/trips/{trip_id}/reimbursements",
            get(settlement::pending_reimbursements).post(settlement::record_collaboration_expense),
        )
        .route(
            "/expenses/{expense_id}/settle",
            post(settlement::settle_reimbursement),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
