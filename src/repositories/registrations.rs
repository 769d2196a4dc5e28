use sqlx::PgConnection;

use crate::db::models::Registration;

/// Registrations shown in course lists. Dropped students stay in the result.
pub(crate) async fn list_listed(
    conn: &mut PgConnection,
    course_id: &str,
) -> Result<Vec<Registration>, sqlx::Error> {
    sqlx::query_as::<_, Registration>(
        "SELECT r.user_id,
                u.name AS display_name,
                u.last_name || ', ' || u.first_name AS sort_name,
                r.role,
                r.dropped_date
         FROM registrations r
         JOIN users u ON u.id = r.user_id
         WHERE r.course_id = $1 AND r.show_in_lists
         ORDER BY u.last_name, u.first_name, r.user_id",
    )
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await
}
