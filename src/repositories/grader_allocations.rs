use sqlx::PgConnection;

use crate::db::models::GraderAllocation;

const ALLOCATION_COLUMNS: &str =
    "id, assignment_id, submission_id, who_grades_id, grading_completed";

pub(crate) async fn list_for_grader(
    conn: &mut PgConnection,
    grader_id: &str,
    course_id: &str,
) -> Result<Vec<GraderAllocation>, sqlx::Error> {
    sqlx::query_as::<_, GraderAllocation>(&format!(
        "SELECT {ALLOCATION_COLUMNS}
         FROM grader_allocations
         WHERE who_grades_id = $1 AND course_id = $2
         ORDER BY assignment_id, id"
    ))
    .bind(grader_id)
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await
}
