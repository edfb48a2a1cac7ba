//! Keyed background computations observed from composition.

use perfkit_core::{group, useState, CancelToken, LaunchedEffect, LaunchedEffectScope};
use web_time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncStatus {
    Idle,
    Pending,
    Resolved,
    Rejected(String),
}

/// Latest outcome of a [`use_async`] computation.
///
/// `data` keeps the last resolved value while a newer run is pending, so a
/// list can stay on screen while its next filter result is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncState<T> {
    pub status: AsyncStatus,
    pub data: Option<T>,
}

impl<T> AsyncState<T> {
    pub fn is_pending(&self) -> bool {
        self.status == AsyncStatus::Pending
    }
}

/// Runs `work` on a worker thread whenever `key` changes.
///
/// A run superseded by a newer key, or whose caller left the composition, is
/// cancelled through its [`CancelToken`] and its result is dropped. Only the
/// latest run can update the returned state.
#[track_caller]
pub fn use_async<K, T, W>(key: K, work: W) -> AsyncState<T>
where
    K: std::hash::Hash,
    T: Clone + Send + 'static,
    W: FnOnce(CancelToken) -> Result<T, String> + Send + 'static,
{
    group(move || {
        let state = useState(|| AsyncState {
            status: AsyncStatus::Idle,
            data: None,
        });
        let target = state.clone();
        LaunchedEffect!(key, move |scope: LaunchedEffectScope| {
            target.update(|current| current.status = AsyncStatus::Pending);
            let started = Instant::now();
            scope.launch_background(work, move |result: Result<T, String>| {
                log::debug!("async work settled in {:?}", started.elapsed());
                target.update(|current| match result {
                    Ok(data) => {
                        current.status = AsyncStatus::Resolved;
                        current.data = Some(data);
                    }
                    Err(reason) => current.status = AsyncStatus::Rejected(reason),
                });
            });
        });
        state.value()
    })
}
