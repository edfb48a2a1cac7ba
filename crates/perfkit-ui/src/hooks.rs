#![allow(non_snake_case)]

use std::time::Duration;

use perfkit_core::{group, useState, LaunchedEffectAsync, LaunchedEffectScope, MutableState};

/// Handle returned by [`useForceRerender`].
#[derive(Clone, PartialEq)]
pub struct ForceRerender {
    tick: MutableState<u64>,
}

impl ForceRerender {
    pub fn trigger(&self) {
        self.tick.update(|tick| *tick += 1);
    }
}

/// Lets a component re-render itself on demand, without any state change its
/// children could observe.
#[track_caller]
pub fn useForceRerender() -> ForceRerender {
    group(|| {
        let tick = useState(|| 0u64);
        tick.with(|_| ());
        ForceRerender { tick }
    })
}

#[derive(Clone)]
struct PendingValue<T> {
    value: T,
    requested_at: u64,
}

/// Setter returned by [`useDebouncedState`].
pub struct Debounced<T: Clone + 'static> {
    pending: MutableState<Option<PendingValue<T>>>,
    committed: MutableState<T>,
}

impl<T: Clone + 'static> Clone for Debounced<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            committed: self.committed.clone(),
        }
    }
}

impl<T: Clone + 'static> Debounced<T> {
    /// Schedules `value`. It is committed once no newer value arrived for the
    /// debounce delay, measured on the frame clock.
    pub fn set(&self, value: T) {
        let requested_at = self
            .pending
            .runtime_handle()
            .last_frame_nanos();
        self.pending.set(Some(PendingValue {
            value,
            requested_at,
        }));
    }

    /// Latest requested value, committed or not. Untracked.
    pub fn latest(&self) -> T {
        match self.pending.peek(|pending| pending.as_ref().map(|p| p.value.clone())) {
            Some(value) => value,
            None => self.committed.peek(Clone::clone),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.peek(Option::is_some)
    }
}

/// State whose writes land only after `delay` without further writes.
///
/// Returns the committed value, which subscribes the caller, and the setter.
#[track_caller]
pub fn useDebouncedState<T: Clone + 'static>(
    init: impl FnOnce() -> T,
    delay: Duration,
) -> (T, Debounced<T>) {
    group(move || {
        let committed = useState(init);
        let pending = useState(|| None::<PendingValue<T>>);
        let debounced = Debounced {
            pending: pending.clone(),
            committed: committed.clone(),
        };

        // A newer request restarts the wait. Requests within one frame share
        // a timestamp and the wait picks up whichever value is latest.
        let requested_at = pending.with(|pending| pending.as_ref().map(|p| p.requested_at));
        let delay_nanos = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        let (pending_in, committed_in) = (pending.clone(), committed.clone());
        LaunchedEffectAsync!(requested_at, move |scope: LaunchedEffectScope| {
            let clock = scope.runtime().frame_clock();
            Box::pin(async move {
                let Some(started) = requested_at else {
                    return;
                };
                loop {
                    let now = clock.next_frame().await;
                    if now.saturating_sub(started) >= delay_nanos {
                        break;
                    }
                }
                if let Some(PendingValue { value, .. }) = pending_in.replace(None) {
                    committed_in.set(value);
                }
            })
        });
        (committed.value(), debounced)
    })
}
