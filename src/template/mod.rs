pub(crate) mod model;
pub(crate) mod patch;
pub(crate) mod upload;
