use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories::PgSnapshot;
use crate::schemas::report::{
    ConsistencyReportResponse, GradingQueueGroupResponse, GradingQueueResponse,
    GradingUnitStateResponse, ScoreReportQuery, ScoreReportResponse, StudentScoreResponse,
    UnpublishedGradeResponse, UnpublishedGradesResponse, UnselectedSubmissionsResponse,
    WorkloadResponse,
};
use crate::services::ledger;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:course_id/scores", get(scores))
        .route("/:course_id/consistency", get(consistency))
        .route("/:course_id/graders/:grader_id/workload", get(workload))
        .route("/:course_id/grading-queue", get(grading_queue))
        .route("/:course_id/unpublished-grades", get(unpublished_grades))
        .route(
            "/:course_id/assignments/:assignment_id/students/:user_id/state",
            get(grading_unit_state),
        )
}

async fn open_snapshot(state: &AppState) -> Result<PgSnapshot, ApiError> {
    PgSnapshot::begin(state.db())
        .await
        .map_err(|err| ApiError::database(err, "Failed to open record snapshot"))
}

async fn close_snapshot(snapshot: PgSnapshot) {
    if let Err(err) = snapshot.finish().await {
        tracing::warn!(error = %err, "Failed to close record snapshot");
    }
}

async fn scores(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<ScoreReportQuery>,
) -> Result<Json<ScoreReportResponse>, ApiError> {
    query.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "scores",
        &course_id,
        ledger::score_report(&snapshot, &course_id, query.students.as_deref(), now),
    )
    .await;
    close_snapshot(snapshot).await;
    let rows = result.map_err(|e| ApiError::store(e, "Failed to build score report"))?;

    Ok(Json(ScoreReportResponse {
        course_id,
        generated_at: format_primitive(now),
        students: rows.into_iter().map(StudentScoreResponse::from_score).collect(),
    }))
}

async fn consistency(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<ConsistencyReportResponse>, ApiError> {
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "consistency",
        &course_id,
        ledger::consistency_report(&snapshot, &course_id),
    )
    .await;
    close_snapshot(snapshot).await;
    let findings = result.map_err(|e| ApiError::store(e, "Failed to check submissions"))?;

    Ok(Json(ConsistencyReportResponse {
        course_id,
        assignments: findings
            .into_iter()
            .map(UnselectedSubmissionsResponse::from_finding)
            .collect(),
    }))
}

async fn workload(
    State(state): State<AppState>,
    Path((course_id, grader_id)): Path<(String, String)>,
) -> Result<Json<WorkloadResponse>, ApiError> {
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "workload",
        &course_id,
        ledger::workload_report(&snapshot, &grader_id, &course_id),
    )
    .await;
    close_snapshot(snapshot).await;
    let workload = result.map_err(|e| ApiError::store(e, "Failed to load grader workload"))?;

    Ok(Json(WorkloadResponse::from_workload(course_id, grader_id, workload)))
}

async fn grading_queue(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<GradingQueueResponse>, ApiError> {
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "grading_queue",
        &course_id,
        ledger::pending_grading_queue(&snapshot, &course_id),
    )
    .await;
    close_snapshot(snapshot).await;
    let groups = result.map_err(|e| ApiError::store(e, "Failed to build grading queue"))?;

    Ok(Json(GradingQueueResponse {
        course_id,
        assignments: groups.into_iter().map(GradingQueueGroupResponse::from_group).collect(),
    }))
}

async fn unpublished_grades(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<UnpublishedGradesResponse>, ApiError> {
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "unpublished_grades",
        &course_id,
        ledger::unpublished_grades(&snapshot, &course_id),
    )
    .await;
    close_snapshot(snapshot).await;
    let grades = result.map_err(|e| ApiError::store(e, "Failed to list unpublished grades"))?;

    Ok(Json(UnpublishedGradesResponse {
        course_id,
        grades: grades.into_iter().map(UnpublishedGradeResponse::from).collect(),
    }))
}

async fn grading_unit_state(
    State(state): State<AppState>,
    Path((course_id, assignment_id, user_id)): Path<(String, String, String)>,
) -> Result<Json<GradingUnitStateResponse>, ApiError> {
    let snapshot = open_snapshot(&state).await?;
    let result = ledger::instrumented(
        "grading_unit_state",
        &course_id,
        ledger::grading_unit_state(&snapshot, &course_id, &assignment_id, &user_id),
    )
    .await;
    close_snapshot(snapshot).await;
    let unit_state = result.map_err(|e| ApiError::store(e, "Failed to classify grading unit"))?;

    Ok(Json(GradingUnitStateResponse { course_id, assignment_id, user_id, state: unit_state }))
}
