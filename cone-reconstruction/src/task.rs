use crate::{
    ReconstructionError, ReconstructionInput, ReconstructionOutput, Reconstructor, Stage,
    StageEvent, StageObserver,
};
use log::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Forwards stage boundaries over a channel and cancels when the shared flag is raised.
struct ChannelObserver {
    events: Sender<StageEvent>,
    cancelled: Arc<AtomicBool>,
}

impl StageObserver for ChannelObserver {
    fn stage_started(&mut self, stage: Stage) -> ControlFlow<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return ControlFlow::Break(());
        }
        // The receiving side may have been dropped, which is not a reason to stop.
        self.events.send(StageEvent::Started(stage)).ok();
        ControlFlow::Continue(())
    }

    fn stage_finished(&mut self, stage: Stage) {
        self.events.send(StageEvent::Finished(stage)).ok();
    }
}

/// A reconstruction running on its own thread.
///
/// The task owns its input, so the caller is free to keep working while it runs. Stage
/// boundaries arrive on [`ReconstructionTask::events`]. Cancellation is coarse and takes
/// effect before the next stage starts.
pub struct ReconstructionTask {
    handle: JoinHandle<Result<ReconstructionOutput, ReconstructionError>>,
    events: Receiver<StageEvent>,
    cancelled: Arc<AtomicBool>,
}

impl ReconstructionTask {
    pub fn spawn(reconstructor: Reconstructor, input: ReconstructionInput) -> Self {
        let (sender, events) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let observer = ChannelObserver {
            events: sender,
            cancelled: cancelled.clone(),
        };
        let handle = thread::spawn(move || {
            let mut observer = observer;
            reconstructor.reconstruct_with_observer(&input, &mut observer)
        });
        Self {
            handle,
            events,
            cancelled,
        }
    }

    /// The stage boundaries reported so far and in the future.
    pub fn events(&self) -> &Receiver<StageEvent> {
        &self.events
    }

    /// Requests the reconstruction to stop before its next stage.
    pub fn cancel(&self) {
        debug!("cancellation of background reconstruction requested");
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the reconstruction to end and returns its result.
    pub fn join(self) -> Result<ReconstructionOutput, ReconstructionError> {
        self.handle
            .join()
            .map_err(|_| ReconstructionError::WorkerPanicked)?
    }
}
