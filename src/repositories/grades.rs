use sqlx::PgConnection;

use crate::db::models::Grade;

pub(crate) async fn list_by_submission_ids(
    conn: &mut PgConnection,
    submission_ids: &[String],
) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(
        "SELECT submission_id, score, available
         FROM grades
         WHERE submission_id = ANY($1)",
    )
    .bind(submission_ids)
    .fetch_all(&mut *conn)
    .await
}
