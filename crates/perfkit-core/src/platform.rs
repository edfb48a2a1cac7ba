//! Host integration points for the runtime.

/// Schedules work for the runtime.
///
/// Hosts implement this to learn that a frame should be produced, for example
/// after a background thread posted a result. Implementations must be usable
/// from any thread.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Scheduler for hosts that drive frames themselves (headless shells, tests).
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}
