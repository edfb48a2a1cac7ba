use crate::runtime::{FrameCallbackId, RuntimeHandle};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Per-frame callbacks driven by the host.
///
/// Callbacks registered here run once, the next time the host calls
/// [`RuntimeHandle::drain_frame_callbacks`], and receive the frame timestamp.
#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let runtime = self.runtime.clone();
        let id = runtime.register_frame_callback(callback);
        FrameCallbackRegistration { runtime, id }
    }

    pub fn with_frame_millis(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        self.with_frame_nanos(move |nanos| callback(nanos / 1_000_000))
    }

    /// Future resolving with the timestamp of the next frame.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            clock: self.clone(),
            state: Rc::new(RefCell::new(NextFrameState::default())),
        }
    }
}

/// Keeps a frame callback registered. Dropping it unregisters the callback.
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }

    /// Leave the callback registered after this handle is dropped.
    pub fn detach(mut self) {
        self.id = None;
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

#[derive(Default)]
struct NextFrameState {
    registration: Option<FrameCallbackRegistration>,
    time: Option<u64>,
    waker: Option<Waker>,
}

pub struct NextFrame {
    clock: FrameClock,
    state: Rc<RefCell<NextFrameState>>,
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(time) = self.state.borrow().time {
            return Poll::Ready(time);
        }
        let needs_registration = {
            let mut state = self.state.borrow_mut();
            state.waker = Some(cx.waker().clone());
            state.registration.is_none()
        };
        if needs_registration {
            let weak = Rc::downgrade(&self.state);
            let registration = self.clock.with_frame_nanos(move |time| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let waker = {
                    let mut state = state.borrow_mut();
                    state.time = Some(time);
                    // Already fired; nothing left to cancel.
                    if let Some(registration) = state.registration.take() {
                        registration.detach();
                    }
                    state.waker.take()
                };
                if let Some(waker) = waker {
                    waker.wake();
                }
            });
            self.state.borrow_mut().registration = Some(registration);
        }
        Poll::Pending
    }
}
