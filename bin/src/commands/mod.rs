//! CLI command implementations.

pub(crate) mod bucket;
pub(crate) mod periods;
pub(crate) mod run;
