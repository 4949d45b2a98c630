// Bounded-time execution of one plan on its own task
use crate::error::InvokeError;
use crate::unit::{CallableUnit, Plan};
use crate::value::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("deadline of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error("worker task failed: {0}")]
    Aborted(String),
}

/// Runs each plan as one spawned unit of work with a deadline. An expired
/// deadline aborts the task, which drops the unit's execution future.
#[derive(Debug, Clone)]
pub struct Worker {
    base_timeout: Duration,
}

impl Worker {
    pub fn new(base_timeout: Duration) -> Self {
        Self { base_timeout }
    }

    pub fn base_timeout(&self) -> Duration {
        self.base_timeout
    }

    /// Base deadline scaled by `factor` (at least one base period)
    pub fn scaled(&self, factor: u32) -> Duration {
        self.base_timeout.saturating_mul(factor.max(1))
    }

    pub async fn run<U: CallableUnit>(
        &self,
        unit: &Arc<U>,
        plan: Plan,
        deadline: Duration,
    ) -> Result<Vec<Value>, WorkerError> {
        let unit = Arc::clone(unit);
        let mut handle = tokio::spawn(async move { unit.execute(plan).await });

        match tokio::time::timeout(deadline, &mut handle).await {
            Ok(Ok(result)) => result.map_err(WorkerError::from),
            Ok(Err(join_err)) => Err(WorkerError::Aborted(join_err.to_string())),
            Err(_) => {
                handle.abort();
                warn!(deadline_ms = deadline.as_millis() as u64, "Plan exceeded deadline, aborted");
                Err(WorkerError::Timeout(deadline))
            }
        }
    }
}

/// `2 seconds`, `0.5 seconds`
pub fn seconds_label(deadline: Duration) -> String {
    let secs = deadline.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{} seconds", deadline.as_secs())
    } else {
        format!("{} seconds", secs)
    }
}
