//! Read-only grading ledger: score projections, consistency checks and
//! grading backlogs computed over one snapshot of course records.

use std::future::Future;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::core::metrics;

pub(crate) mod consistency;
mod index;
pub(crate) mod lifecycle;
pub(crate) mod projection;
pub(crate) mod publication;
pub(crate) mod store;
pub(crate) mod workload;

pub(crate) use consistency::{consistency_report, UnselectedSubmissions};
pub(crate) use lifecycle::{grading_unit_state, GradingUnitState};
pub(crate) use projection::{score_report, CurrentPercent, StudentScore};
pub(crate) use publication::{
    pending_grading_queue, unpublished_grades, GradingQueueGroup, UnpublishedGrade,
};
pub(crate) use store::{RecordStore, StoreError};
pub(crate) use workload::{workload_report, Workload};

/// A student as shown in report listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentRef {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
}

/// Runs one report inside a `ledger_report` span and records its outcome.
pub(crate) async fn instrumented<T, F>(
    report: &'static str,
    course_id: &str,
    run: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("ledger_report", report, course_id, %run_id);
    let started = Instant::now();

    let result = run.instrument(span.clone()).await;
    let elapsed = started.elapsed();

    match &result {
        Ok(_) => {
            metrics::record_report(report, "ok", elapsed);
            span.in_scope(|| {
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Ledger report finished");
            });
        }
        Err(err) => {
            metrics::record_report(report, "error", elapsed);
            span.in_scope(|| tracing::error!(error = %err, "Ledger report failed"));
        }
    }

    result
}
