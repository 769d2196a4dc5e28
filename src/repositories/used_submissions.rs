use sqlx::PgConnection;

use crate::db::models::UsedSubmission;

pub(crate) async fn list_for_assignments(
    conn: &mut PgConnection,
    course_id: &str,
    assignment_ids: &[String],
) -> Result<Vec<UsedSubmission>, sqlx::Error> {
    sqlx::query_as::<_, UsedSubmission>(
        "SELECT u.assignment_id, u.user_id, u.submission_id
         FROM used_subs u
         JOIN assignments a ON a.id = u.assignment_id
         WHERE a.course_id = $1 AND u.assignment_id = ANY($2)
         ORDER BY u.assignment_id, u.user_id",
    )
    .bind(course_id)
    .bind(assignment_ids)
    .fetch_all(&mut *conn)
    .await
}

pub(crate) async fn list_for_assignments_and_users(
    conn: &mut PgConnection,
    course_id: &str,
    assignment_ids: &[String],
    user_ids: &[String],
) -> Result<Vec<UsedSubmission>, sqlx::Error> {
    sqlx::query_as::<_, UsedSubmission>(
        "SELECT u.assignment_id, u.user_id, u.submission_id
         FROM used_subs u
         JOIN assignments a ON a.id = u.assignment_id
         WHERE a.course_id = $1 AND u.assignment_id = ANY($2) AND u.user_id = ANY($3)
         ORDER BY u.assignment_id, u.user_id",
    )
    .bind(course_id)
    .bind(assignment_ids)
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
}
