pub(crate) mod errors;
pub(crate) mod handlers;
pub(crate) mod reports;
pub(crate) mod router;
