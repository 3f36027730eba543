//! Run coordination: per-playlist locks, bounded run-all, retries and the
//! periodic trigger.

mod coordinator;
pub mod lock;
pub mod retry;
pub mod scheduler;

pub use coordinator::{
    Coordinator, FailureKind, PLAY_TARGET, RunOutcome, RunReport, RunnerConfig, UserRunSummary,
};
pub use lock::{RunGuard, RunKey, RunLocks};
pub use retry::{RetryPolicy, Retrying};
