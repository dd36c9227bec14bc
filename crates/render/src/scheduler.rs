/// "Call me again before the next repaint."
///
/// The renderer requests exactly one frame at the end of each frame and
/// returns; the host decides when to invoke it again.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

impl<F: FnMut()> FrameScheduler for F {
    fn request_frame(&mut self) {
        self()
    }
}

/// Scheduler that only counts requests. A host loop drains the count by
/// calling the renderer synchronously.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingScheduler {
    pending: u32,
    total: u64,
}

impl CountingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one pending request, if any.
    pub fn take(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Requests received over the scheduler's lifetime.
    pub fn total_requests(&self) -> u64 {
        self.total
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.pending += 1;
        self.total += 1;
    }
}
