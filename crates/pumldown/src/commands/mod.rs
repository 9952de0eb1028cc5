//! CLI command implementations.

mod common;
pub(crate) mod render;
pub(crate) mod watch;

pub(crate) use render::RenderArgs;
pub(crate) use watch::WatchArgs;
