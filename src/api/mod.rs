pub(crate) mod assembly;
pub(crate) mod errors;
pub(crate) mod handlers;
pub(crate) mod router;
