pub(crate) mod evaluator;
pub(crate) mod layers;
pub(crate) mod style;
