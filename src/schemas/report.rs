use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::GraderAllocation;
use crate::services::ledger::{
    GradingQueueGroup, GradingUnitState, StudentRef, StudentScore, UnpublishedGrade,
    UnselectedSubmissions, Workload,
};

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ScoreReportQuery {
    /// Comma separated user ids. Absent or empty means every student.
    #[serde(default, deserialize_with = "comma_separated")]
    #[validate(length(max = 500, message = "at most 500 students per request"))]
    pub(crate) students: Option<Vec<String>>,
}

fn comma_separated<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|ids| !ids.is_empty()))
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentScoreResponse {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) dropped_date: Option<String>,
    pub(crate) min: f64,
    /// `null` until the student has scored work on released assignments.
    pub(crate) current: Option<f64>,
    pub(crate) max: f64,
    pub(crate) pending_points: f64,
    pub(crate) pending_assignments: Vec<String>,
    pub(crate) at_risk_points: f64,
    pub(crate) at_risk_assignments: Vec<String>,
    pub(crate) released_total: f64,
    pub(crate) course_capacity: f64,
    pub(crate) unreleased_headroom: f64,
}

impl StudentScoreResponse {
    pub(crate) fn from_score(score: StudentScore) -> Self {
        Self {
            user_id: score.user_id,
            display_name: score.display_name,
            dropped_date: score.dropped_date.map(format_primitive),
            min: score.min,
            current: score.current.value(),
            max: score.max,
            pending_points: score.pending_points,
            pending_assignments: score.pending_names,
            at_risk_points: score.at_risk_points,
            at_risk_assignments: score.at_risk_names,
            released_total: score.released_total,
            course_capacity: score.course_capacity,
            unreleased_headroom: score.unreleased_headroom,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreReportResponse {
    pub(crate) course_id: String,
    pub(crate) generated_at: String,
    pub(crate) students: Vec<StudentScoreResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentRefResponse {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
}

impl From<StudentRef> for StudentRefResponse {
    fn from(student: StudentRef) -> Self {
        Self { user_id: student.user_id, display_name: student.display_name }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UnselectedSubmissionsResponse {
    pub(crate) assignment_id: String,
    pub(crate) assignment_name: String,
    pub(crate) due_at: String,
    pub(crate) students: Vec<StudentRefResponse>,
}

impl UnselectedSubmissionsResponse {
    pub(crate) fn from_finding(finding: UnselectedSubmissions) -> Self {
        Self {
            assignment_id: finding.assignment_id,
            assignment_name: finding.assignment_name,
            due_at: format_primitive(finding.due_at),
            students: finding.students.into_iter().map(StudentRefResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ConsistencyReportResponse {
    pub(crate) course_id: String,
    pub(crate) assignments: Vec<UnselectedSubmissionsResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllocationResponse {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) grading_completed: Option<String>,
}

impl AllocationResponse {
    fn from_allocation(allocation: GraderAllocation) -> Self {
        Self {
            id: allocation.id,
            submission_id: allocation.submission_id,
            grading_completed: allocation.grading_completed.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkloadResponse {
    pub(crate) course_id: String,
    pub(crate) grader_id: String,
    pub(crate) outstanding_count: usize,
    pub(crate) done_but_unscored_count: usize,
    pub(crate) outstanding: BTreeMap<String, Vec<AllocationResponse>>,
    pub(crate) done_but_unscored: BTreeMap<String, Vec<AllocationResponse>>,
}

impl WorkloadResponse {
    pub(crate) fn from_workload(course_id: String, grader_id: String, workload: Workload) -> Self {
        Self {
            course_id,
            grader_id,
            outstanding_count: workload.outstanding_count(),
            done_but_unscored_count: workload.done_but_unscored_count(),
            outstanding: group_allocations(workload.outstanding),
            done_but_unscored: group_allocations(workload.done_but_unscored),
        }
    }
}

fn group_allocations(
    groups: BTreeMap<String, Vec<GraderAllocation>>,
) -> BTreeMap<String, Vec<AllocationResponse>> {
    groups
        .into_iter()
        .map(|(assignment_id, allocations)| {
            let allocations =
                allocations.into_iter().map(AllocationResponse::from_allocation).collect();
            (assignment_id, allocations)
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub(crate) struct QueuedSubmissionResponse {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) submission_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradingQueueGroupResponse {
    pub(crate) assignment_id: String,
    pub(crate) assignment_name: String,
    pub(crate) due_at: String,
    pub(crate) submissions: Vec<QueuedSubmissionResponse>,
}

impl GradingQueueGroupResponse {
    pub(crate) fn from_group(group: GradingQueueGroup) -> Self {
        Self {
            assignment_id: group.assignment_id,
            assignment_name: group.assignment_name,
            due_at: format_primitive(group.due_at),
            submissions: group
                .entries
                .into_iter()
                .map(|entry| QueuedSubmissionResponse {
                    user_id: entry.student.user_id,
                    display_name: entry.student.display_name,
                    submission_id: entry.submission_id,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradingQueueResponse {
    pub(crate) course_id: String,
    pub(crate) assignments: Vec<GradingQueueGroupResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UnpublishedGradeResponse {
    pub(crate) submission_id: String,
    pub(crate) assignment_id: String,
    pub(crate) user_id: String,
    pub(crate) student_name: String,
    pub(crate) score: f64,
}

impl From<UnpublishedGrade> for UnpublishedGradeResponse {
    fn from(grade: UnpublishedGrade) -> Self {
        Self {
            submission_id: grade.submission_id,
            assignment_id: grade.assignment_id,
            user_id: grade.user_id,
            student_name: grade.student_name,
            score: grade.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UnpublishedGradesResponse {
    pub(crate) course_id: String,
    pub(crate) grades: Vec<UnpublishedGradeResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradingUnitStateResponse {
    pub(crate) course_id: String,
    pub(crate) assignment_id: String,
    pub(crate) user_id: String,
    pub(crate) state: GradingUnitState,
}
