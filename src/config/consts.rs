/// Delay before the second attempt is `BASE * MULTIPLIER`, i.e. 2 seconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Exponential backoff growth factor
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;
/// Upper bound on any single backoff sleep
pub const DEFAULT_MAX_DELAY_MS: u64 = 300_000;
/// Tasks slower than this get an optimization suggestion
pub const DEFAULT_SLOW_TASK_THRESHOLD_SECS: u64 = 60;
/// Below this share of the sequential sum, parallelism is considered ineffective
pub const DEFAULT_MIN_PARALLEL_SAVINGS_RATIO: f64 = 0.3;
/// Fraction over the estimate before a task is reported as overrunning
pub const DEFAULT_OVERRUN_TOLERANCE: f64 = 0.5;
/// Largest accepted overrun tolerance (100x the estimate)
pub const MAX_OVERRUN_TOLERANCE: f64 = 100.0;
/// Role-based reviewers required when a close needs approval
pub const DEFAULT_APPROVERS: [&str; 2] = ["financial-controller", "cfo"];
