//! Cosmetic progress simulation.
//!
//! The service reports no transfer progress, so each in-flight stage
//! advances through fixed checkpoints on a timer, exactly as a spinner
//! would. Completion never waits on this; the ticker is aborted the moment
//! the stage settles.

use crate::pipeline::orchestrator::PipelineShared;
use crate::pipeline::state::StageClass;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub(crate) const CHECKPOINTS: [u8; 4] = [25, 50, 75, 95];
pub(crate) const TICK: Duration = Duration::from_millis(400);

/// Advances a stage's displayed progress while its network call is
/// outstanding. Dropping the ticker stops it.
pub(crate) struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub(crate) fn start(shared: Arc<PipelineShared>, class: StageClass, generation: u64) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;
            for checkpoint in CHECKPOINTS {
                interval.tick().await;
                if !shared.is_current(class, generation) {
                    return;
                }
                shared.bump_progress(class, generation, checkpoint);
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
