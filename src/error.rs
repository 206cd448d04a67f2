//! Error taxonomy for chunk optimization
//!
//! Configuration errors detected while a policy runs are appended to the
//! compilation's error list rather than thrown; the misconfigured policy
//! aborts its own work and the rest of the build continues.

use thiserror::Error;

/// Errors reported to the compilation during chunk optimization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimizeError {
    /// No chunk names were given and neither the async nor the children
    /// mode is enabled, so there is nothing to target
    #[error("no valid target chunk settings: specify chunk names or enable the async/children mode")]
    NoTargetChunks,

    /// In normal mode only entry chunks may become commons chunks
    #[error("cannot use non-entry chunk ({0}) as a commons chunk in normal mode")]
    NonEntryTarget(String),
}
