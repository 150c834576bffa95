//! Example: Nested Tasks
//!
//! Logs a fake deployment as a nested operation tree. Output goes to
//! standard error with a two-space indent per nesting level.
//!
//! Run with:
//! ```bash
//! cargo run --example nested_tasks
//! ```

use nestlog::{Context, Logger, logf};

fn main() {
    let log = Logger::builder().indent("  ").build();

    let ctx = log.log(&Context::new(), "deploying service");

    let fetch = log.log(&ctx, "fetching artifacts");
    logf!(log, &fetch, "resolved {} layers", 3);

    let migrate = log.log(&ctx, "running migrations");
    for name in ["0001_init", "0002_indexes"] {
        let step = logf!(log, &migrate, "applying {}", name);
        log.log(&step, "ok");
    }

    log.log(&ctx, "done");
}
