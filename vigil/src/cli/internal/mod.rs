//! Internal utilities shared by CLI commands.
//!
//! Namespace and pod resolution live in `resource`; the log wait used by
//! `await-log` and `patch --await-log` lives in `log_wait`.

mod log_wait;
mod resource;

pub use self::{
    log_wait::await_log_line,
    resource::{PodTargetArgs, ResourceResolver},
};
