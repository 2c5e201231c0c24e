use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use prizedesk_core::{ListResult, ServiceError};

use super::{AwardState, run_blocking};
use crate::model::{PrizeAward, SelfCheck};

pub fn router(state: AwardState) -> Router {
    Router::new()
        .route("/winners", get(list_winners))
        .route("/winners/{employee_id}", get(check_employee))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /winners
// ---------------------------------------------------------------------------

async fn list_winners(
    State(state): State<AwardState>,
) -> Result<Json<ListResult<PrizeAward>>, ServiceError> {
    let query = state.query.clone();
    let all = run_blocking(move || query.all_winners()).await?;
    Ok(Json(all.into()))
}

// ---------------------------------------------------------------------------
// GET /winners/{employee_id}
// ---------------------------------------------------------------------------

/// Public lookup. Not winning is a normal answer, not a 404.
async fn check_employee(
    State(state): State<AwardState>,
    Path(employee_id): Path<String>,
) -> Result<Json<SelfCheck>, ServiceError> {
    let query = state.query.clone();
    let check = run_blocking(move || query.self_check(&employee_id)).await?;
    Ok(Json(check))
}
