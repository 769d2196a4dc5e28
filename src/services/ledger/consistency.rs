use time::PrimitiveDateTime;

use crate::db::models::{Assignment, RawSubmission, Registration, UsedSubmission};

use super::index::{self, RawSubmitterIndex, UsedIndex};
use super::store::{RecordStore, StoreError};
use super::StudentRef;

/// Students who submitted to an assignment but have no used submission selected.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnselectedSubmissions {
    pub(crate) assignment_id: String,
    pub(crate) assignment_name: String,
    pub(crate) due_at: PrimitiveDateTime,
    pub(crate) students: Vec<StudentRef>,
}

/// Detection report only; nothing is repaired. Assignments come back in due order,
/// students in roster order, and assignments without findings are omitted.
pub(crate) async fn consistency_report<S>(
    store: &S,
    course_id: &str,
) -> Result<Vec<UnselectedSubmissions>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let mut assignments = store.assignments_for(course_id).await?;
    if assignments.is_empty() {
        return Ok(Vec::new());
    }
    index::sort_by_due(&mut assignments);

    let registrations = store.active_registrations_for(course_id).await?;
    let active: Vec<&Registration> = registrations
        .iter()
        .filter(|registration| registration.role.is_student() && !registration.is_dropped())
        .collect();
    if active.is_empty() {
        return Ok(Vec::new());
    }
    tracing::debug!(
        course_id,
        students = active.len(),
        staff = registrations.iter().filter(|registration| registration.role.is_staff()).count(),
        "Checking submission selection"
    );

    let assignment_ids = index::assignment_ids(&assignments);
    let raw = store.raw_submissions_for(&assignment_ids).await?;
    let used = store.used_submissions_for(course_id, &assignment_ids, None).await?;

    let findings = find_unselected(&assignments, &active, &raw, &used);
    if !findings.is_empty() {
        tracing::info!(
            course_id,
            assignments = findings.len(),
            students = findings.iter().map(|finding| finding.students.len()).sum::<usize>(),
            "Submissions without a used submission selected"
        );
    }

    Ok(findings)
}

/// `assignments` must already be in due order.
pub(crate) fn find_unselected(
    assignments: &[Assignment],
    students: &[&Registration],
    raw: &[RawSubmission],
    used: &[UsedSubmission],
) -> Vec<UnselectedSubmissions> {
    let submitters = RawSubmitterIndex::build(raw);
    let used_index = UsedIndex::build(used);

    assignments
        .iter()
        .filter_map(|assignment| {
            let submitted = submitters.submitters(&assignment.id)?;
            let flagged: Vec<StudentRef> = students
                .iter()
                .filter(|student| submitted.contains(student.user_id.as_str()))
                .filter(|student| !used_index.contains(&assignment.id, &student.user_id))
                .map(|student| StudentRef {
                    user_id: student.user_id.clone(),
                    display_name: student.display_name.clone(),
                })
                .collect();

            (!flagged.is_empty()).then(|| UnselectedSubmissions {
                assignment_id: assignment.id.clone(),
                assignment_name: assignment.name.clone(),
                due_at: assignment.due_at,
                students: flagged,
            })
        })
        .collect()
}
