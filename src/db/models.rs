use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::CourseRole;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) points_available: f64,
    pub(crate) available_at: Option<PrimitiveDateTime>,
    pub(crate) due_at: PrimitiveDateTime,
}

impl Assignment {
    /// Released once the availability time has passed; no availability time means never.
    pub(crate) fn is_released(&self, now: PrimitiveDateTime) -> bool {
        self.available_at.is_some_and(|available_at| available_at <= now)
    }

    pub(crate) fn is_open(&self, now: PrimitiveDateTime) -> bool {
        self.is_released(now) && self.due_at > now
    }

    pub(crate) fn carries_points(&self) -> bool {
        self.points_available != 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct UsedSubmission {
    pub(crate) assignment_id: String,
    pub(crate) user_id: String,
    pub(crate) submission_id: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub(crate) struct Grade {
    pub(crate) submission_id: String,
    pub(crate) score: Option<f64>,
    pub(crate) available: bool,
}

/// A raw submission already resolved to the user it counts for.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct RawSubmission {
    pub(crate) assignment_id: String,
    pub(crate) submitter_id: String,
    pub(crate) submission_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct GraderAllocation {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) submission_id: String,
    pub(crate) who_grades_id: String,
    pub(crate) grading_completed: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub(crate) struct Registration {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) sort_name: String,
    pub(crate) role: CourseRole,
    pub(crate) dropped_date: Option<PrimitiveDateTime>,
}

impl Registration {
    pub(crate) fn is_dropped(&self) -> bool {
        self.dropped_date.is_some()
    }
}
