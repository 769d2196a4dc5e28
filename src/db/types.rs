use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Role a user holds inside one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "courserole", rename_all = "lowercase")]
pub(crate) enum CourseRole {
    Student,
    Professor,
    Grader,
    Assistant,
}

impl CourseRole {
    pub(crate) fn is_student(self) -> bool {
        match self {
            CourseRole::Student => true,
            CourseRole::Professor | CourseRole::Grader | CourseRole::Assistant => false,
        }
    }

    pub(crate) fn is_staff(self) -> bool {
        match self {
            CourseRole::Student => false,
            CourseRole::Professor | CourseRole::Grader | CourseRole::Assistant => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CourseRole;

    #[test]
    fn student_and_staff_partition_roles() {
        for role in
            [CourseRole::Student, CourseRole::Professor, CourseRole::Grader, CourseRole::Assistant]
        {
            assert_ne!(role.is_student(), role.is_staff(), "{role:?}");
        }
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&CourseRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: CourseRole = serde_json::from_str("\"grader\"").unwrap();
        assert_eq!(parsed, CourseRole::Grader);
    }
}
