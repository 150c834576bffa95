//! Depth-aware context logging.
//!
//! This crate provides one mechanism: an immutable [`Context`] carries a
//! nesting-depth counter, and each [`Logger`] call writes one line indented
//! proportionally to that depth, then returns a child context one level
//! deeper for nested sub-operations. Sequential log output ends up shaped
//! like the call tree that produced it, without a structured-logging or
//! tracing system.
//!
//! # Design Principles
//!
//! - Contexts are persistent and never mutated: deriving a child leaves
//!   every holder of the parent untouched, so unrelated operation trees can
//!   share contexts across threads without locking
//! - One logical line is one write: concurrent callers sharing a logger are
//!   serialized per line and lines never interleave
//! - Defaults (standard error, one-tab indent) are installed lazily, exactly
//!   once, even under concurrent first use
//! - Logging never fails from the caller's perspective; sink errors are
//!   swallowed, with `try_` variants for callers that want to observe them
//!
//! # Example
//!
//! ```
//! use nestlog::{Context, Logger};
//!
//! fn restore(log: &Logger, ctx: &Context) {
//!     let ctx = log.log(ctx, "restoring snapshot");
//!     for shard in ["users", "orders"] {
//!         let ctx = log.log(&ctx, shard);
//!         log.log(&ctx, "verified");
//!     }
//! }
//!
//! let log = Logger::new();
//! restore(&log, &Context::new());
//! ```
//!
//! produces (on standard error):
//!
//! ```text
//! restoring snapshot
//! 	users
//! 		verified
//! 	orders
//! 		verified
//! ```
//!
//! # Diagnostics
//!
//! The crate reports its own rare diagnostics (dropped lines on sink
//! failure) through the standard [`log`] facade; see [`targets`] for the
//! filterable target names. No log implementation is included — initialize
//! whichever backend the application prefers.

#![forbid(unsafe_code)]

mod context;
mod logger;
mod template;

pub use context::Context;
pub use logger::{Logger, LoggerBuilder};

/// Log targets used for nestlog's own diagnostics.
///
/// Use these with a `log` backend's filter to route or silence them,
/// e.g. `RUST_LOG=nestlog::sink=off`.
pub mod targets {
    /// Root target for all nestlog diagnostics.
    pub const NESTLOG: &str = "nestlog";

    /// Sink write failures (lines dropped by fire-and-forget logging).
    pub const SINK: &str = "nestlog::sink";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_hierarchical() {
        assert!(targets::SINK.starts_with(targets::NESTLOG));
    }
}
