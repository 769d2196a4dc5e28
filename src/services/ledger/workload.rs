use std::collections::BTreeMap;

use crate::db::models::{Grade, GraderAllocation};

use super::index::{self, GradeIndex};
use super::store::{RecordStore, StoreError};

/// Grader allocations for one grader in one course, grouped by assignment id.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Workload {
    pub(crate) outstanding: BTreeMap<String, Vec<GraderAllocation>>,
    /// Marked complete, yet the submission still has no score. Needs follow-up.
    pub(crate) done_but_unscored: BTreeMap<String, Vec<GraderAllocation>>,
}

impl Workload {
    pub(crate) fn outstanding_count(&self) -> usize {
        self.outstanding.values().map(Vec::len).sum()
    }

    pub(crate) fn done_but_unscored_count(&self) -> usize {
        self.done_but_unscored.values().map(Vec::len).sum()
    }
}

pub(crate) async fn workload_report<S>(
    store: &S,
    grader_id: &str,
    course_id: &str,
) -> Result<Workload, StoreError>
where
    S: RecordStore + ?Sized,
{
    let allocations = store.grader_allocations_for(grader_id, course_id).await?;

    let completed_ids = index::submission_ids(
        allocations
            .iter()
            .filter(|allocation| allocation.grading_completed.is_some())
            .map(|allocation| allocation.submission_id.as_str()),
    );
    let grades =
        if completed_ids.is_empty() { Vec::new() } else { store.grades_for(&completed_ids).await? };

    let workload = partition_allocations(allocations, &grades);
    tracing::debug!(
        course_id,
        grader_id,
        outstanding = workload.outstanding_count(),
        done_but_unscored = workload.done_but_unscored_count(),
        "Partitioned grader workload"
    );

    Ok(workload)
}

pub(crate) fn partition_allocations(
    allocations: Vec<GraderAllocation>,
    grades: &[Grade],
) -> Workload {
    let grade_index = GradeIndex::build(grades);
    let mut workload = Workload::default();

    for allocation in allocations {
        if allocation.grading_completed.is_none() {
            workload
                .outstanding
                .entry(allocation.assignment_id.clone())
                .or_default()
                .push(allocation);
        } else if grade_index.score(&allocation.submission_id).is_none() {
            workload
                .done_but_unscored
                .entry(allocation.assignment_id.clone())
                .or_default()
                .push(allocation);
        }
    }

    workload
}
