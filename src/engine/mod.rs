pub mod executor;
pub mod grouper;
pub mod orchestrator;
pub mod registry;
pub mod retry;
#[cfg(test)]
pub mod integration_tests;

pub use executor::TaskExecutor;
pub use grouper::{DependencyGrouper, Grouping};
pub use orchestrator::{ClosePhase, ClosingEngine};
pub use registry::InFlightRegistry;
pub use retry::{AttemptOutcome, RetryDecision, RetryPolicy};
