use std::collections::{HashMap, HashSet};

use crate::db::models::{Assignment, Grade, RawSubmission, Registration, UsedSubmission};

/// Assignments ordered by due date, then name, then id.
pub(super) fn sort_by_due(assignments: &mut [Assignment]) {
    assignments.sort_by(|a, b| {
        a.due_at.cmp(&b.due_at).then_with(|| a.name.cmp(&b.name)).then_with(|| a.id.cmp(&b.id))
    });
}

pub(super) fn assignment_ids(assignments: &[Assignment]) -> Vec<String> {
    assignments.iter().map(|assignment| assignment.id.clone()).collect()
}

pub(super) fn submission_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).map(str::to_string).collect()
}

/// Used submissions keyed by assignment id, then user id.
#[derive(Debug, Default)]
pub(super) struct UsedIndex<'a> {
    by_assignment: HashMap<&'a str, HashMap<&'a str, &'a UsedSubmission>>,
}

impl<'a> UsedIndex<'a> {
    pub(super) fn build(used: &'a [UsedSubmission]) -> Self {
        let mut by_assignment: HashMap<&str, HashMap<&str, &UsedSubmission>> = HashMap::new();
        for row in used {
            let previous = by_assignment
                .entry(row.assignment_id.as_str())
                .or_default()
                .insert(row.user_id.as_str(), row);
            if previous.is_some() {
                tracing::warn!(
                    assignment_id = %row.assignment_id,
                    user_id = %row.user_id,
                    "Duplicate used submission for one assignment/user pair; keeping the last"
                );
            }
        }
        Self { by_assignment }
    }

    pub(super) fn get(&self, assignment_id: &str, user_id: &str) -> Option<&'a UsedSubmission> {
        self.by_assignment.get(assignment_id).and_then(|users| users.get(user_id)).copied()
    }

    pub(super) fn contains(&self, assignment_id: &str, user_id: &str) -> bool {
        self.get(assignment_id, user_id).is_some()
    }
}

/// Grades keyed by submission id.
#[derive(Debug, Default)]
pub(super) struct GradeIndex<'a> {
    by_submission: HashMap<&'a str, &'a Grade>,
}

impl<'a> GradeIndex<'a> {
    pub(super) fn build(grades: &'a [Grade]) -> Self {
        let by_submission =
            grades.iter().map(|grade| (grade.submission_id.as_str(), grade)).collect();
        Self { by_submission }
    }

    pub(super) fn get(&self, submission_id: &str) -> Option<&'a Grade> {
        self.by_submission.get(submission_id).copied()
    }

    /// Missing grade rows count as unscored.
    pub(super) fn score(&self, submission_id: &str) -> Option<f64> {
        self.get(submission_id).and_then(|grade| grade.score)
    }
}

/// Users with at least one raw submission, per assignment.
#[derive(Debug, Default)]
pub(super) struct RawSubmitterIndex<'a> {
    by_assignment: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> RawSubmitterIndex<'a> {
    pub(super) fn build(raw: &'a [RawSubmission]) -> Self {
        let mut by_assignment: HashMap<&str, HashSet<&str>> = HashMap::new();
        for row in raw {
            by_assignment
                .entry(row.assignment_id.as_str())
                .or_default()
                .insert(row.submitter_id.as_str());
        }
        Self { by_assignment }
    }

    pub(super) fn submitters(&self, assignment_id: &str) -> Option<&HashSet<&'a str>> {
        self.by_assignment.get(assignment_id)
    }
}

/// Registrations keyed by user id.
pub(super) fn registrations_by_user(
    registrations: &[Registration],
) -> HashMap<&str, &Registration> {
    registrations.iter().map(|registration| (registration.user_id.as_str(), registration)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assignment, at_day};

    #[test]
    fn sort_by_due_breaks_ties_by_name() {
        let mut assignments = vec![
            assignment("a3", "Zeta", 10.0, Some(at_day(1)), at_day(5)),
            assignment("a1", "Beta", 10.0, Some(at_day(1)), at_day(3)),
            assignment("a2", "Alpha", 10.0, Some(at_day(1)), at_day(5)),
        ];
        sort_by_due(&mut assignments);
        let order: Vec<&str> = assignments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(order, vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn submission_ids_are_deduplicated_in_order() {
        let ids = submission_ids(["s2", "s1", "s2", "s3"].into_iter());
        assert_eq!(ids, vec!["s2".to_string(), "s1".to_string(), "s3".to_string()]);
    }

    #[test]
    fn missing_grade_reads_as_unscored() {
        let grades = vec![Grade { submission_id: "s1".into(), score: Some(80.0), available: true }];
        let index = GradeIndex::build(&grades);
        assert_eq!(index.score("s1"), Some(80.0));
        assert_eq!(index.score("s2"), None);
        assert!(index.get("s2").is_none());
    }
}
