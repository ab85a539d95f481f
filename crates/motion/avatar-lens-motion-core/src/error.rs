use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("chain '{chain}' diverged and was reset to rest")]
    Diverged { chain: String },
    #[error("chain '{chain}' failed: {message}")]
    Chain { chain: String, message: String },
    #[error("{failed} of {total} chains failed in '{solver}'")]
    ChainsFailed {
        solver: String,
        failed: usize,
        total: usize,
    },
    #[error("driver '{0}' is already being updated")]
    Busy(String),
}
