pub(crate) mod clock;
pub(crate) mod export;
pub(crate) mod preview;
pub(crate) mod schedule;
