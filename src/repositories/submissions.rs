use sqlx::PgConnection;

use crate::db::models::RawSubmission;

/// Raw submissions resolved to the users they count for. A team submission
/// yields one row per team member.
pub(crate) async fn list_resolved(
    conn: &mut PgConnection,
    assignment_ids: &[String],
) -> Result<Vec<RawSubmission>, sqlx::Error> {
    sqlx::query_as::<_, RawSubmission>(
        "SELECT s.assignment_id, s.user_id AS submitter_id, s.id AS submission_id
         FROM submissions s
         WHERE s.assignment_id = ANY($1) AND s.user_id IS NOT NULL
         UNION
         SELECT s.assignment_id, tu.user_id AS submitter_id, s.id AS submission_id
         FROM submissions s
         JOIN team_users tu ON tu.team_id = s.team_id
         WHERE s.assignment_id = ANY($1)
         ORDER BY assignment_id, submitter_id, submission_id",
    )
    .bind(assignment_ids)
    .fetch_all(&mut *conn)
    .await
}
