// cancel.rs
use crate::errors::PipelineError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::warn;

/// Shared stop flag checked between pipeline steps. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Errors out once the token has been tripped.
    pub fn check(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `wait` in short slices. Returns `false` if the token was
    /// tripped before the time was up.
    pub fn sleep(&self, wait: Duration) -> bool {
        const SLICE: Duration = Duration::from_millis(100);
        let end = Instant::now() + wait;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let left = end.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return true;
            }
            std::thread::sleep(left.min(SLICE));
        }
    }

    /// Trips the token after `deadline` unless the process is done first.
    pub fn cancel_after(&self, deadline: Duration) -> JoinHandle<()> {
        let token = self.clone();
        std::thread::spawn(move || {
            std::thread::sleep(deadline);
            if !token.is_cancelled() {
                warn!(?deadline, "⏱️ Run deadline reached, cancelling");
                token.cancel();
            }
        })
    }
}
