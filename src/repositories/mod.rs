pub(crate) mod assignments;
pub(crate) mod grader_allocations;
pub(crate) mod grades;
pub(crate) mod health;
pub(crate) mod registrations;
pub(crate) mod snapshot;
pub(crate) mod submissions;
pub(crate) mod used_submissions;

pub(crate) use snapshot::PgSnapshot;
