use sqlx::PgConnection;

use crate::db::models::Assignment;

const ASSIGNMENT_COLUMNS: &str = "id, name, points_available, available_at, due_at";

pub(crate) async fn list_for_course(
    conn: &mut PgConnection,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS}
         FROM assignments
         WHERE course_id = $1
         ORDER BY due_at, name, id"
    ))
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await
}
