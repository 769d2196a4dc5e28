use std::collections::HashSet;

use time::PrimitiveDateTime;

use crate::db::models::{Assignment, Grade, Registration, UsedSubmission};

use super::index::{self, GradeIndex, UsedIndex};
use super::store::{RecordStore, StoreError};

/// Points a course is measured against unless its assignments add up to more.
pub(crate) const CAPACITY_BASELINE: f64 = 100.0;

/// Denominators at or below this are treated as zero.
const POINT_EPSILON: f64 = 1e-9;

/// Current percentage of a student.
///
/// `NotComputable` whenever the student has no scored work on released
/// assignments or the released-minus-pending denominator is not positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CurrentPercent {
    Computed(f64),
    NotComputable,
}

impl CurrentPercent {
    pub(crate) fn value(self) -> Option<f64> {
        match self {
            CurrentPercent::Computed(value) => Some(value),
            CurrentPercent::NotComputable => None,
        }
    }
}

/// Course-wide totals shared by every student row of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CourseBasis {
    pub(crate) released_total: f64,
    pub(crate) course_capacity: f64,
    pub(crate) unreleased_headroom: f64,
    /// False when the course has no assignments; projections then collapse onto `min`.
    pub(crate) configured: bool,
}

impl CourseBasis {
    pub(crate) fn from_assignments(assignments: &[Assignment], now: PrimitiveDateTime) -> Self {
        if assignments.is_empty() {
            return Self {
                released_total: 0.0,
                course_capacity: CAPACITY_BASELINE,
                unreleased_headroom: 0.0,
                configured: false,
            };
        }

        let released_total: f64 = assignments
            .iter()
            .filter(|assignment| assignment.is_released(now))
            .map(|assignment| assignment.points_available)
            .sum();
        let course_total: f64 =
            assignments.iter().map(|assignment| assignment.points_available).sum();
        let course_capacity = course_total.max(CAPACITY_BASELINE);

        Self {
            released_total,
            course_capacity,
            unreleased_headroom: (course_capacity - released_total).max(0.0),
            configured: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StudentScore {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) dropped_date: Option<PrimitiveDateTime>,
    pub(crate) min: f64,
    pub(crate) current: CurrentPercent,
    pub(crate) max: f64,
    pub(crate) pending_points: f64,
    pub(crate) pending_names: Vec<String>,
    pub(crate) at_risk_points: f64,
    pub(crate) at_risk_names: Vec<String>,
    pub(crate) released_total: f64,
    pub(crate) course_capacity: f64,
    pub(crate) unreleased_headroom: f64,
}

/// Score rows for the course's students.
///
/// `students = None` reports every student registration shown in course lists,
/// dropped ones included. Requested ids that are not students of the course
/// are skipped.
pub(crate) async fn score_report<S>(
    store: &S,
    course_id: &str,
    students: Option<&[String]>,
    now: PrimitiveDateTime,
) -> Result<Vec<StudentScore>, StoreError>
where
    S: RecordStore + ?Sized,
{
    let mut assignments = store.assignments_for(course_id).await?;
    index::sort_by_due(&mut assignments);

    let registrations = store.active_registrations_for(course_id).await?;
    let targets = select_students(&registrations, students);
    if targets.is_empty() {
        tracing::debug!(course_id, "No students to project");
        return Ok(Vec::new());
    }

    let released: Vec<&Assignment> =
        assignments.iter().filter(|assignment| assignment.is_released(now)).collect();
    let released_ids: Vec<String> =
        released.iter().map(|assignment| assignment.id.clone()).collect();

    let (used, grades) = if released_ids.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let user_ids: Vec<String> =
            targets.iter().map(|registration| registration.user_id.clone()).collect();
        let used = store.used_submissions_for(course_id, &released_ids, Some(&user_ids)).await?;
        let submission_ids =
            index::submission_ids(used.iter().map(|row| row.submission_id.as_str()));
        let grades = if submission_ids.is_empty() {
            Vec::new()
        } else {
            store.grades_for(&submission_ids).await?
        };
        (used, grades)
    };

    tracing::debug!(
        course_id,
        students = targets.len(),
        assignments = assignments.len(),
        released = released.len(),
        used_submissions = used.len(),
        grades = grades.len(),
        "Projecting scores"
    );

    Ok(project_scores(&assignments, &targets, &used, &grades, now))
}

fn select_students<'a>(
    registrations: &'a [Registration],
    requested: Option<&[String]>,
) -> Vec<&'a Registration> {
    let students = registrations.iter().filter(|registration| registration.role.is_student());

    let Some(requested) = requested else {
        return students.collect();
    };

    let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
    let selected: Vec<&Registration> =
        students.filter(|registration| wanted.contains(registration.user_id.as_str())).collect();

    if selected.len() < wanted.len() {
        let found: HashSet<&str> =
            selected.iter().map(|registration| registration.user_id.as_str()).collect();
        let mut missing: Vec<&str> = wanted.difference(&found).copied().collect();
        missing.sort_unstable();
        tracing::warn!(missing = ?missing, "Requested users are not students of this course");
    }

    selected
}

/// Pure projection over one snapshot. Output is ordered by sort name.
///
/// `assignments` must already be in due order; name lists follow it.
pub(crate) fn project_scores(
    assignments: &[Assignment],
    students: &[&Registration],
    used: &[UsedSubmission],
    grades: &[Grade],
    now: PrimitiveDateTime,
) -> Vec<StudentScore> {
    let basis = CourseBasis::from_assignments(assignments, now);
    if !basis.configured {
        tracing::warn!("Course has no assignments; projections collapse onto graded value");
    }

    let released: Vec<&Assignment> =
        assignments.iter().filter(|assignment| assignment.is_released(now)).collect();

    let used_index = UsedIndex::build(used);
    let grade_index = GradeIndex::build(grades);

    let mut ordered = students.to_vec();
    ordered.sort_by(|a, b| {
        a.sort_name
            .cmp(&b.sort_name)
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    ordered
        .into_iter()
        .map(|student| project_student(student, &released, &basis, &used_index, &grade_index, now))
        .collect()
}

fn project_student(
    student: &Registration,
    released: &[&Assignment],
    basis: &CourseBasis,
    used: &UsedIndex<'_>,
    grades: &GradeIndex<'_>,
    now: PrimitiveDateTime,
) -> StudentScore {
    let mut graded_value = 0.0;
    let mut scored = 0usize;
    let mut pending_points = 0.0;
    let mut pending_names = Vec::new();
    let mut at_risk_points = 0.0;
    let mut at_risk_names = Vec::new();

    for assignment in released {
        if !assignment.carries_points() {
            continue;
        }

        match used.get(&assignment.id, &student.user_id) {
            Some(selected) => match grades.score(&selected.submission_id) {
                Some(score) => {
                    graded_value += score * assignment.points_available / 100.0;
                    scored += 1;
                }
                None => {
                    pending_points += assignment.points_available;
                    pending_names.push(assignment.name.clone());
                }
            },
            None if assignment.is_open(now) => {
                at_risk_points += assignment.points_available;
                at_risk_names.push(assignment.name.clone());
            }
            None => {}
        }
    }

    let denominator = basis.released_total - pending_points;
    let current = if basis.configured && scored > 0 && denominator > POINT_EPSILON {
        CurrentPercent::Computed(100.0 * graded_value / denominator)
    } else {
        CurrentPercent::NotComputable
    };

    StudentScore {
        user_id: student.user_id.clone(),
        display_name: student.display_name.clone(),
        dropped_date: student.dropped_date,
        min: graded_value,
        current,
        max: graded_value + basis.unreleased_headroom,
        pending_points,
        pending_names,
        at_risk_points,
        at_risk_names,
        released_total: basis.released_total,
        course_capacity: basis.course_capacity,
        unreleased_headroom: basis.unreleased_headroom,
    }
}
