mod employees;
mod prizes;
mod winners;

use std::sync::Arc;

use axum::Router;
use prizedesk_core::ServiceError;

use crate::engine::AllocationEngine;
use crate::gate::EventGate;
use crate::query::AwardQuery;
use crate::roster::RosterStore;

/// Shared handler state. Cheap to clone; every field is an `Arc`.
#[derive(Clone)]
pub struct AwardState {
    pub engine: Arc<AllocationEngine>,
    pub query: Arc<AwardQuery>,
    pub roster: Arc<RosterStore>,
    pub gate: Arc<dyn EventGate>,
}

/// Build the complete award module router.
///
/// Routes:
/// - `GET    /prizes`                    : catalog tiers with live tally
/// - `GET    /prizes/{name}/winners`     : winners of one prize
/// - `POST   /prizes/{name}/@award`      : scan a badge for a prize
/// - `GET    /winners`                   : leaderboard
/// - `GET    /winners/{employee_id}`     : "did I win?"
/// - `GET    /employees`                 : roster
/// - `PUT    /employees`                 : replace roster
/// - `GET    /employees/{employee_id}`   : one employee
pub fn router(state: AwardState) -> Router {
    Router::new()
        .merge(prizes::router(state.clone()))
        .merge(winners::router(state.clone()))
        .merge(employees::router(state))
}

/// Run storage work on the blocking pool.
///
/// SQLite calls block, and a read can wait on a writer's lock, so handlers
/// never touch the store on an async worker. A write closure owns its
/// transaction and runs to commit or rollback even if the client disconnects
/// and the handler future is dropped.
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {e}")))?
}
