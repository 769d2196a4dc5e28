use std::collections::{BTreeMap, HashMap, HashSet};

use time::PrimitiveDateTime;

use crate::db::models::{Assignment, Grade, Registration, UsedSubmission};

use super::index::{self, GradeIndex};
use super::store::{RecordStore, StoreError};
use super::StudentRef;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueuedSubmission {
    pub(crate) student: StudentRef,
    pub(crate) submission_id: String,
}

/// Unscored used submissions of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradingQueueGroup {
    pub(crate) assignment_id: String,
    pub(crate) assignment_name: String,
    pub(crate) due_at: PrimitiveDateTime,
    pub(crate) entries: Vec<QueuedSubmission>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnpublishedGrade {
    pub(crate) submission_id: String,
    pub(crate) assignment_id: String,
    pub(crate) user_id: String,
    pub(crate) student_name: String,
    pub(crate) score: f64,
}

struct CourseUsage {
    assignments: Vec<Assignment>,
    registrations: Vec<Registration>,
    used: Vec<UsedSubmission>,
    grades: Vec<Grade>,
}

async fn load_usage<S>(store: &S, course_id: &str) -> Result<CourseUsage, StoreError>
where
    S: RecordStore + ?Sized,
{
    let mut assignments = store.assignments_for(course_id).await?;
    index::sort_by_due(&mut assignments);
    if assignments.is_empty() {
        return Ok(CourseUsage {
            assignments,
            registrations: Vec::new(),
            used: Vec::new(),
            grades: Vec::new(),
        });
    }

    let assignment_ids = index::assignment_ids(&assignments);
    let used = store.used_submissions_for(course_id, &assignment_ids, None).await?;
    let submission_ids = index::submission_ids(used.iter().map(|row| row.submission_id.as_str()));
    let grades = if submission_ids.is_empty() {
        Vec::new()
    } else {
        store.grades_for(&submission_ids).await?
    };
    let registrations = store.active_registrations_for(course_id).await?;

    Ok(CourseUsage { assignments, registrations, used, grades })
}

/// The grading backlog: used submissions of students with no score yet,
/// grouped by assignment in due order, students by display name.
pub(crate) async fn pending_grading_queue<S>(
    store: &S,
    course_id: &str,
) -> Result<Vec<GradingQueueGroup>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let usage = load_usage(store, course_id).await?;
    let queue =
        build_grading_queue(&usage.assignments, &usage.registrations, &usage.used, &usage.grades);
    tracing::debug!(
        course_id,
        assignments = queue.len(),
        submissions = queue.iter().map(|group| group.entries.len()).sum::<usize>(),
        "Built pending grading queue"
    );
    Ok(queue)
}

/// Scored but withheld grades, one row per submission, ordered by student name.
pub(crate) async fn unpublished_grades<S>(
    store: &S,
    course_id: &str,
) -> Result<Vec<UnpublishedGrade>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let usage = load_usage(store, course_id).await?;
    let rows = collect_unpublished(&usage.registrations, &usage.used, &usage.grades);
    tracing::debug!(course_id, grades = rows.len(), "Collected unpublished grades");
    Ok(rows)
}

/// `assignments` must already be in due order.
pub(crate) fn build_grading_queue(
    assignments: &[Assignment],
    registrations: &[Registration],
    used: &[UsedSubmission],
    grades: &[Grade],
) -> Vec<GradingQueueGroup> {
    let students: HashMap<&str, &Registration> = index::registrations_by_user(registrations)
        .into_iter()
        .filter(|(_, registration)| registration.role.is_student())
        .collect();
    let grade_index = GradeIndex::build(grades);

    let mut by_assignment: HashMap<&str, Vec<QueuedSubmission>> = HashMap::new();
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::new();
    for row in used {
        let Some(student) = students.get(row.user_id.as_str()) else {
            continue;
        };
        if grade_index.score(&row.submission_id).is_some() {
            continue;
        }
        let key = (row.assignment_id.as_str(), row.user_id.as_str(), row.submission_id.as_str());
        if !seen.insert(key) {
            continue;
        }
        by_assignment.entry(row.assignment_id.as_str()).or_default().push(QueuedSubmission {
            student: StudentRef {
                user_id: student.user_id.clone(),
                display_name: student.display_name.clone(),
            },
            submission_id: row.submission_id.clone(),
        });
    }

    assignments
        .iter()
        .filter_map(|assignment| {
            let mut entries = by_assignment.remove(assignment.id.as_str())?;
            entries.sort_by(|a, b| {
                a.student
                    .display_name
                    .cmp(&b.student.display_name)
                    .then_with(|| a.student.user_id.cmp(&b.student.user_id))
            });
            Some(GradingQueueGroup {
                assignment_id: assignment.id.clone(),
                assignment_name: assignment.name.clone(),
                due_at: assignment.due_at,
                entries,
            })
        })
        .collect()
}

pub(crate) fn collect_unpublished(
    registrations: &[Registration],
    used: &[UsedSubmission],
    grades: &[Grade],
) -> Vec<UnpublishedGrade> {
    let names = index::registrations_by_user(registrations);
    let grade_index = GradeIndex::build(grades);

    // Team submissions are shared; the alphabetically first member names the row.
    let mut by_submission: BTreeMap<&str, UnpublishedGrade> = BTreeMap::new();
    for row in used {
        let Some(grade) = grade_index.get(&row.submission_id) else {
            continue;
        };
        let Some(score) = grade.score else {
            continue;
        };
        if grade.available {
            continue;
        }

        let student_name = names
            .get(row.user_id.as_str())
            .map(|registration| registration.display_name.clone())
            .unwrap_or_else(|| row.user_id.clone());
        let candidate = UnpublishedGrade {
            submission_id: row.submission_id.clone(),
            assignment_id: row.assignment_id.clone(),
            user_id: row.user_id.clone(),
            student_name,
            score,
        };

        let replace = by_submission.get(row.submission_id.as_str()).map_or(true, |existing| {
            (&candidate.student_name, &candidate.user_id)
                < (&existing.student_name, &existing.user_id)
        });
        if replace {
            by_submission.insert(row.submission_id.as_str(), candidate);
        }
    }

    let mut rows: Vec<UnpublishedGrade> = by_submission.into_values().collect();
    rows.sort_by(|a, b| {
        a.student_name.cmp(&b.student_name).then_with(|| a.submission_id.cmp(&b.submission_id))
    });
    rows
}
