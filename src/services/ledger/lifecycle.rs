use serde::Serialize;

use crate::db::models::{Grade, RawSubmission, UsedSubmission};

use super::store::{RecordStore, StoreError};

/// Where one (assignment, student) grading unit stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GradingUnitState {
    NoSubmission,
    Submitted,
    /// A used submission is chosen but no grade row exists yet.
    Selected,
    /// A grade row exists without a score.
    GradedPending,
    ScoredUnpublished,
    Published,
}

impl GradingUnitState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            GradingUnitState::NoSubmission => "no_submission",
            GradingUnitState::Submitted => "submitted",
            GradingUnitState::Selected => "selected",
            GradingUnitState::GradedPending => "graded_pending",
            GradingUnitState::ScoredUnpublished => "scored_unpublished",
            GradingUnitState::Published => "published",
        }
    }
}

pub(crate) async fn grading_unit_state<S>(
    store: &S,
    course_id: &str,
    assignment_id: &str,
    user_id: &str,
) -> Result<GradingUnitState, StoreError>
where
    S: RecordStore + ?Sized,
{
    let assignment_ids = [assignment_id.to_string()];
    let user_ids = [user_id.to_string()];

    let used = store.used_submissions_for(course_id, &assignment_ids, Some(&user_ids)).await?;
    let used = used
        .into_iter()
        .find(|row| row.user_id == user_id && row.assignment_id == assignment_id);

    let grade = match &used {
        Some(row) => {
            let grades = store.grades_for(std::slice::from_ref(&row.submission_id)).await?;
            grades.into_iter().find(|grade| grade.submission_id == row.submission_id)
        }
        None => None,
    };

    let raw = if used.is_none() {
        store.raw_submissions_for(&assignment_ids).await?
    } else {
        Vec::new()
    };

    let state = classify(user_id, &raw, used.as_ref(), grade.as_ref());
    tracing::debug!(
        course_id,
        assignment_id,
        user_id,
        state = state.as_str(),
        "Classified grading unit"
    );
    Ok(state)
}

/// A used submission outranks raw submissions; raw rows only matter without one.
pub(crate) fn classify(
    user_id: &str,
    raw: &[RawSubmission],
    used: Option<&UsedSubmission>,
    grade: Option<&Grade>,
) -> GradingUnitState {
    match (used, grade) {
        (Some(_), None) => GradingUnitState::Selected,
        (Some(_), Some(grade)) => match (grade.score, grade.available) {
            (None, _) => GradingUnitState::GradedPending,
            (Some(_), false) => GradingUnitState::ScoredUnpublished,
            (Some(_), true) => GradingUnitState::Published,
        },
        (None, _) if raw.iter().any(|row| row.submitter_id == user_id) => {
            GradingUnitState::Submitted
        }
        (None, _) => GradingUnitState::NoSubmission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    async fn state_of(store: &MemoryStore) -> GradingUnitState {
        grading_unit_state(store, "c1", "hw1", "u1").await.expect("state")
    }

    #[tokio::test]
    async fn walks_through_every_state() {
        assert_eq!(state_of(&MemoryStore::new()).await, GradingUnitState::NoSubmission);

        let submitted = MemoryStore::new().with_raw("hw1", "u1", "s1");
        assert_eq!(state_of(&submitted).await, GradingUnitState::Submitted);

        let selected = submitted.clone().with_used("hw1", "u1", "s1");
        assert_eq!(state_of(&selected).await, GradingUnitState::Selected);

        let pending = selected.clone().with_grade("s1", None, false);
        assert_eq!(state_of(&pending).await, GradingUnitState::GradedPending);

        let scored = selected.clone().with_grade("s1", Some(75.0), false);
        assert_eq!(state_of(&scored).await, GradingUnitState::ScoredUnpublished);

        let published = selected.with_grade("s1", Some(75.0), true);
        assert_eq!(state_of(&published).await, GradingUnitState::Published);
    }

    #[tokio::test]
    async fn other_students_submissions_do_not_count() {
        let store = MemoryStore::new()
            .with_raw("hw1", "u2", "s1")
            .with_used("hw1", "u2", "s1")
            .with_raw("hw2", "u1", "s2");

        assert_eq!(state_of(&store).await, GradingUnitState::NoSubmission);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = MemoryStore::new().with_used("hw1", "u1", "s1").failing("grades_for");

        let err = grading_unit_state(&store, "c1", "hw1", "u1").await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn states_render_snake_case() {
        let json = serde_json::to_string(&GradingUnitState::ScoredUnpublished).expect("json");
        assert_eq!(json, "\"scored_unpublished\"");
        assert_eq!(GradingUnitState::GradedPending.as_str(), "graded_pending");
    }
}
