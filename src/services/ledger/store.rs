use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{
    Assignment, Grade, GraderAllocation, RawSubmission, Registration, UsedSubmission,
};

/// Failure reading from the record store. Engine operations hand it back untouched.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("record store query failed: {0}")]
    Database(sqlx::Error),
    /// The store could not be reached at all; retrying later may succeed.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => Self::Unavailable(err.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Read side of the grading records, scoped per course.
///
/// Implementations must answer every call of one report run from the same
/// consistent snapshot.
#[async_trait]
pub(crate) trait RecordStore: Send + Sync {
    async fn assignments_for(&self, course_id: &str) -> Result<Vec<Assignment>, StoreError>;

    /// `user_ids = None` returns used submissions for every user.
    async fn used_submissions_for(
        &self,
        course_id: &str,
        assignment_ids: &[String],
        user_ids: Option<&[String]>,
    ) -> Result<Vec<UsedSubmission>, StoreError>;

    async fn grades_for(&self, submission_ids: &[String]) -> Result<Vec<Grade>, StoreError>;

    async fn raw_submissions_for(
        &self,
        assignment_ids: &[String],
    ) -> Result<Vec<RawSubmission>, StoreError>;

    async fn grader_allocations_for(
        &self,
        grader_id: &str,
        course_id: &str,
    ) -> Result<Vec<GraderAllocation>, StoreError>;

    /// Registrations shown in course lists, dropped ones included, ordered by last then first name.
    async fn active_registrations_for(
        &self,
        course_id: &str,
    ) -> Result<Vec<Registration>, StoreError>;
}
