//! Driver tests
//!
//! Tests are organized by topic:
//! - `support` - In-process fake worker and sweep fixtures
//! - `sweep` - Ordering, caching, failure and cancellation behaviour
//! - `plan` - Dry-run planning
//! - `process` - End-to-end runs against a shell-script worker (unix only)

mod support;
