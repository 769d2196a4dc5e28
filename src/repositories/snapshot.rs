use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use crate::db::models::{
    Assignment, Grade, GraderAllocation, RawSubmission, Registration, UsedSubmission,
};
use crate::repositories::{
    assignments, grader_allocations, grades, registrations, submissions, used_submissions,
};
use crate::services::ledger::{RecordStore, StoreError};

/// Record store reading every query of one report from a single
/// repeatable-read, read-only transaction.
pub(crate) struct PgSnapshot {
    tx: Mutex<Transaction<'static, Postgres>>,
}

impl PgSnapshot {
    pub(crate) async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(Self { tx: Mutex::new(tx) })
    }

    /// Ends the transaction. Nothing was written, so it is rolled back.
    pub(crate) async fn finish(self) -> Result<(), sqlx::Error> {
        self.tx.into_inner().rollback().await
    }
}

#[async_trait]
impl RecordStore for PgSnapshot {
    async fn assignments_for(&self, course_id: &str) -> Result<Vec<Assignment>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(assignments::list_for_course(&mut tx, course_id).await?)
    }

    async fn used_submissions_for(
        &self,
        course_id: &str,
        assignment_ids: &[String],
        user_ids: Option<&[String]>,
    ) -> Result<Vec<UsedSubmission>, StoreError> {
        let mut tx = self.tx.lock().await;
        let rows = match user_ids {
            Some(user_ids) => {
                used_submissions::list_for_assignments_and_users(
                    &mut tx,
                    course_id,
                    assignment_ids,
                    user_ids,
                )
                .await?
            }
            None => {
                used_submissions::list_for_assignments(&mut tx, course_id, assignment_ids).await?
            }
        };
        Ok(rows)
    }

    async fn grades_for(&self, submission_ids: &[String]) -> Result<Vec<Grade>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(grades::list_by_submission_ids(&mut tx, submission_ids).await?)
    }

    async fn raw_submissions_for(
        &self,
        assignment_ids: &[String],
    ) -> Result<Vec<RawSubmission>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(submissions::list_resolved(&mut tx, assignment_ids).await?)
    }

    async fn grader_allocations_for(
        &self,
        grader_id: &str,
        course_id: &str,
    ) -> Result<Vec<GraderAllocation>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(grader_allocations::list_for_grader(&mut tx, grader_id, course_id).await?)
    }

    async fn active_registrations_for(
        &self,
        course_id: &str,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut tx = self.tx.lock().await;
        Ok(registrations::list_listed(&mut tx, course_id).await?)
    }
}
