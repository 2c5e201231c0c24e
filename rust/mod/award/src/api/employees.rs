use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use prizedesk_core::{ListResult, ServiceError};

use super::{AwardState, run_blocking};
use crate::gate::ensure_open;
use crate::model::{Employee, ImportRequest, ImportSummary};

pub fn router(state: AwardState) -> Router {
    Router::new()
        .route("/employees", get(list_employees).put(replace_employees))
        .route("/employees/{employee_id}", get(get_employee))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /employees
// ---------------------------------------------------------------------------

async fn list_employees(
    State(state): State<AwardState>,
) -> Result<Json<ListResult<Employee>>, ServiceError> {
    let roster = state.roster.clone();
    let employees = run_blocking(move || roster.list()).await?;
    Ok(Json(employees.into()))
}

// ---------------------------------------------------------------------------
// PUT /employees
// ---------------------------------------------------------------------------

async fn replace_employees(
    State(state): State<AwardState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<ImportSummary>, ServiceError> {
    ensure_open(state.gate.as_ref())?;

    let roster = state.roster.clone();
    let summary = run_blocking(move || roster.replace_all(&req.employees)).await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// GET /employees/{employee_id}
// ---------------------------------------------------------------------------

async fn get_employee(
    State(state): State<AwardState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Employee>, ServiceError> {
    let roster = state.roster.clone();
    run_blocking(move || {
        roster
            .get(&employee_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("employee '{employee_id}' not found")))
    })
    .await
    .map(Json)
}
