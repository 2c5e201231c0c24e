use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use prizedesk_core::{ListResult, ServiceError};

use super::{AwardState, run_blocking};
use crate::gate::ensure_open;
use crate::model::{AwardRequest, AwardResponse};

pub fn router(state: AwardState) -> Router {
    Router::new()
        .route("/prizes", get(list_prizes))
        .route("/prizes/{name}/winners", get(prize_winners))
        .route("/prizes/{name}/@award", post(award_prize))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /prizes
// ---------------------------------------------------------------------------

async fn list_prizes(
    State(state): State<AwardState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let query = state.query.clone();
    let tally = run_blocking(move || query.tally()).await?;
    Ok(Json(serde_json::json!({
        "catalogVersion": state.engine.catalog().version(),
        "total": tally.len(),
        "items": tally,
    })))
}

// ---------------------------------------------------------------------------
// GET /prizes/{name}/winners
// ---------------------------------------------------------------------------

async fn prize_winners(
    State(state): State<AwardState>,
    Path(name): Path<String>,
) -> Result<Json<ListResult<String>>, ServiceError> {
    let query = state.query.clone();
    let winners = run_blocking(move || query.winners_for_prize(&name)).await?;
    Ok(Json(winners.into()))
}

// ---------------------------------------------------------------------------
// POST /prizes/{name}/@award
// ---------------------------------------------------------------------------

async fn award_prize(
    State(state): State<AwardState>,
    Path(name): Path<String>,
    Json(req): Json<AwardRequest>,
) -> Result<Json<AwardResponse>, ServiceError> {
    ensure_open(state.gate.as_ref())?;

    let engine = state.engine.clone();
    let query = state.query.clone();
    let (result, winners) = run_blocking(move || {
        let result =
            engine.attempt_award_with_retry(&name, &req.prize_amount, &req.scanned_code)?;
        // Re-read after commit so the operator sees the list including this award.
        let winners = query.winners_for_prize(&name)?;
        Ok((result, winners))
    })
    .await?;

    Ok(Json(AwardResponse {
        message: result.message(),
        result,
        winners,
    }))
}
