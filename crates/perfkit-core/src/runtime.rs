use crate::hash::map::{HashMap, HashSet};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::task::{Context, Poll, Waker};
use std::thread::ThreadId;

use crate::frame_clock::FrameClock;
use crate::platform::{DefaultScheduler, RuntimeScheduler};
use crate::scope::{RecomposeScopeInner, ScopeId};

pub type FrameCallbackId = u64;

enum UiMessage {
    Task(Box<dyn FnOnce() + Send + 'static>),
    Invoke { id: u64, value: Box<dyn Any + Send> },
}

type UiContinuation = Box<dyn FnOnce(Box<dyn Any>) + 'static>;

struct UiDispatcherInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    tx: mpsc::Sender<UiMessage>,
    /// Messages sent but not yet drained on the UI thread.
    pending: AtomicUsize,
    /// Background jobs that have not yet posted their result (or given up).
    in_flight: AtomicUsize,
}

impl UiDispatcherInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, tx: mpsc::Sender<UiMessage>) -> Self {
        Self {
            scheduler,
            tx,
            pending: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn send(&self, message: UiMessage) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(message).is_err() {
            // Runtime is gone; nobody will drain this message.
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        self.scheduler.schedule_frame();
    }

    fn has_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }
}

struct PendingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let previous = self.counter.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "UI dispatcher pending count underflowed");
    }
}

/// Thread-safe entry point for posting work back to the UI thread.
#[derive(Clone)]
pub struct UiDispatcher {
    inner: Arc<UiDispatcherInner>,
}

impl UiDispatcher {
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        self.inner.send(UiMessage::Task(Box::new(task)));
    }

    pub fn post_invoke<T>(&self, id: u64, value: T)
    where
        T: Send + 'static,
    {
        self.inner.send(UiMessage::Invoke {
            id,
            value: Box::new(value),
        });
    }

    pub fn has_pending(&self) -> bool {
        self.inner.has_pending()
    }

    /// Marks the start of a background job. The returned ticket must be
    /// finished (or dropped) once the job has posted its result.
    pub fn begin_background(&self) -> BackgroundTicket {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        BackgroundTicket {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn has_background_work(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Tracks one in-flight background job.
pub struct BackgroundTicket {
    inner: Arc<UiDispatcherInner>,
}

impl Drop for BackgroundTicket {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    invalid_scopes: RefCell<HashSet<ScopeId>>,
    scope_queue: RefCell<Vec<(ScopeId, Weak<RecomposeScopeInner>)>>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    last_frame_nanos: Cell<u64>,
    ui_dispatcher: Arc<UiDispatcherInner>,
    ui_rx: RefCell<mpsc::Receiver<UiMessage>>,
    local_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    ui_conts: RefCell<HashMap<u64, UiContinuation>>,
    next_cont_id: Cell<u64>,
    ui_thread_id: ThreadId,
    tasks: RefCell<Vec<TaskEntry>>,
    next_task_id: Cell<u64>,
    task_waker: RefCell<Option<Waker>>,
}

struct TaskEntry {
    id: u64,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Box<dyn FnOnce(u64) + 'static>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let (tx, rx) = mpsc::channel();
        let dispatcher = Arc::new(UiDispatcherInner::new(scheduler.clone(), tx));
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            invalid_scopes: RefCell::new(HashSet::default()),
            scope_queue: RefCell::new(Vec::new()),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            last_frame_nanos: Cell::new(0),
            ui_dispatcher: dispatcher,
            ui_rx: RefCell::new(rx),
            local_tasks: RefCell::new(VecDeque::new()),
            ui_conts: RefCell::new(HashMap::default()),
            next_cont_id: Cell::new(1),
            ui_thread_id: std::thread::current().id(),
            tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
            task_waker: RefCell::new(None),
        }
    }

    fn init_task_waker(this: &Rc<Self>) {
        let waker = RuntimeTaskWaker {
            scheduler: Arc::clone(&this.scheduler),
        }
        .into_waker();
        *this.task_waker.borrow_mut() = Some(waker);
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn register_invalid_scope(&self, id: ScopeId, scope: Weak<RecomposeScopeInner>) {
        let mut invalid = self.invalid_scopes.borrow_mut();
        if invalid.insert(id) {
            self.scope_queue.borrow_mut().push((id, scope));
            drop(invalid);
            self.schedule();
        }
    }

    fn mark_scope_recomposed(&self, id: ScopeId) {
        self.invalid_scopes.borrow_mut().remove(&id);
    }

    fn take_invalidated_scopes(&self) -> Vec<(ScopeId, Weak<RecomposeScopeInner>)> {
        let pending: Vec<_> = self.scope_queue.borrow_mut().drain(..).collect();
        if pending.is_empty() {
            return pending;
        }
        let invalid = self.invalid_scopes.borrow();
        pending
            .into_iter()
            .filter(|(id, _)| invalid.contains(id))
            .collect()
    }

    fn has_invalid_scopes(&self) -> bool {
        !self.invalid_scopes.borrow().is_empty()
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty()
    }

    fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.local_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn spawn_ui_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.schedule();
        id
    }

    fn cancel_task(&self, id: u64) {
        self.tasks.borrow_mut().retain(|entry| entry.id != id);
    }

    fn poll_async_tasks(&self) -> bool {
        let waker = match self.task_waker.borrow().as_ref() {
            Some(waker) => waker.clone(),
            None => return false,
        };
        let mut cx = Context::from_waker(&waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut pending = Vec::with_capacity(tasks.len());
        let mut made_progress = false;
        for mut entry in tasks {
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => made_progress = true,
                Poll::Pending => pending.push(entry),
            }
        }
        if !pending.is_empty() {
            // Tasks spawned while polling were pushed into the (now empty) list.
            let mut tasks = self.tasks.borrow_mut();
            let spawned = std::mem::take(&mut *tasks);
            tasks.extend(pending);
            tasks.extend(spawned);
        }
        made_progress
    }

    fn drain_ui(&self) {
        loop {
            let mut executed = false;

            loop {
                let message = self.ui_rx.borrow_mut().try_recv();
                let Ok(message) = message else {
                    break;
                };
                executed = true;
                let _guard = PendingGuard {
                    counter: &self.ui_dispatcher.pending,
                };
                match message {
                    UiMessage::Task(task) => task(),
                    UiMessage::Invoke { id, value } => self.invoke_ui_cont(id, value),
                }
            }

            loop {
                let task = self.local_tasks.borrow_mut().pop_front();
                match task {
                    Some(task) => {
                        executed = true;
                        task();
                    }
                    None => break,
                }
            }

            if self.poll_async_tasks() {
                executed = true;
            }

            if !executed {
                break;
            }
        }
    }

    fn has_pending_ui(&self) -> bool {
        let local_pending = self
            .local_tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        local_pending || self.ui_dispatcher.has_pending()
    }

    fn has_async_tasks(&self) -> bool {
        self.tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true)
    }

    fn register_ui_cont<T: 'static>(&self, f: impl FnOnce(T) + 'static) -> u64 {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "UI continuation registered off the runtime thread",
        );
        let id = self.next_cont_id.get();
        self.next_cont_id.set(id + 1);
        self.ui_conts.borrow_mut().insert(
            id,
            Box::new(move |value: Box<dyn Any>| match value.downcast::<T>() {
                Ok(value) => f(*value),
                Err(_) => log::error!("UI continuation {id} received a value of the wrong type"),
            }),
        );
        id
    }

    fn invoke_ui_cont(&self, id: u64, value: Box<dyn Any + Send>) {
        let callback = self.ui_conts.borrow_mut().remove(&id);
        match callback {
            Some(callback) => callback(value),
            None => log::debug!("dropping result for cancelled continuation {id}"),
        }
    }

    fn cancel_ui_cont(&self, id: u64) {
        self.ui_conts.borrow_mut().remove(&id);
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry { id, callback });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        self.frame_callbacks
            .borrow_mut()
            .retain(|entry| entry.id != id);
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        self.last_frame_nanos.set(frame_time_nanos);
        let pending: Vec<_> = self.frame_callbacks.borrow_mut().drain(..).collect();
        for entry in pending {
            (entry.callback)(frame_time_nanos);
        }
    }

    fn is_idle(&self) -> bool {
        !self.has_invalid_scopes()
            && !self.has_frame_callbacks()
            && !self.has_pending_ui()
            && !self.has_async_tasks()
    }
}

/// Owner of the UI-thread runtime state. Dropping it invalidates every
/// [`RuntimeHandle`] derived from it.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let inner = Rc::new(RuntimeInner::new(scheduler));
        RuntimeInner::init_task_waker(&inner);
        Self { inner }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
            dispatcher: UiDispatcher {
                inner: Arc::clone(&self.inner.ui_dispatcher),
            },
            ui_thread_id: self.inner.ui_thread_id,
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get() || self.inner.ui_dispatcher.has_pending()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

/// Weak, cloneable access to a [`Runtime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
    dispatcher: UiDispatcher,
    ui_thread_id: ThreadId,
}

/// Cancels a spawned UI future when asked to.
pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl TaskHandle {
    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

impl RuntimeHandle {
    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Schedules work that must run on the runtime thread.
    ///
    /// The closure may capture `Rc`/`RefCell` values because it never leaves
    /// the UI thread. If the runtime is gone the task runs immediately.
    pub fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        match self.inner.upgrade() {
            Some(inner) => inner.enqueue_ui_task(task),
            None => task(),
        }
    }

    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    /// Enqueues work from any thread to run on the UI thread.
    pub fn post_ui(&self, task: impl FnOnce() + Send + 'static) {
        self.dispatcher.post(task);
    }

    pub fn register_ui_cont<T: 'static>(&self, f: impl FnOnce(T) + 'static) -> Option<u64> {
        self.inner.upgrade().map(|inner| inner.register_ui_cont(f))
    }

    pub fn cancel_ui_cont(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_ui_cont(id);
        }
    }

    /// Runs `work` on a fresh worker thread and hands its result to `on_ui`
    /// on the UI thread. Returns the continuation id, which can be passed to
    /// [`RuntimeHandle::cancel_ui_cont`] to drop the result unseen.
    pub fn spawn_background<T, Work, Ui>(&self, name: &str, work: Work, on_ui: Ui) -> Option<u64>
    where
        T: Send + 'static,
        Work: FnOnce() -> Option<T> + Send + 'static,
        Ui: FnOnce(T) + 'static,
    {
        let cont_id = self.register_ui_cont(on_ui)?;
        let dispatcher = self.dispatcher.clone();
        let ticket = dispatcher.begin_background();
        let spawned = std::thread::Builder::new()
            .name(format!("perfkit-{name}"))
            .spawn(move || {
                let _ticket = ticket;
                if let Some(value) = work() {
                    dispatcher.post_invoke(cont_id, value);
                }
            });
        if let Err(err) = spawned {
            log::error!("failed to spawn background worker {name}: {err}");
            self.cancel_ui_cont(cont_id);
            return None;
        }
        Some(cont_id)
    }

    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or_else(|| self.dispatcher.has_pending())
    }

    /// Whether a worker thread is still computing a result for this runtime.
    pub fn has_background_work(&self) -> bool {
        self.dispatcher.has_background_work()
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    /// Timestamp passed to the most recent frame, in nanoseconds.
    pub fn last_frame_nanos(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.last_frame_nanos.get())
            .unwrap_or(0)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }

    pub(crate) fn register_invalid_scope(&self, id: ScopeId, scope: Weak<RecomposeScopeInner>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.register_invalid_scope(id, scope);
        }
    }

    pub(crate) fn mark_scope_recomposed(&self, id: ScopeId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.mark_scope_recomposed(id);
        }
    }

    pub(crate) fn take_invalidated_scopes(&self) -> Vec<(ScopeId, Weak<RecomposeScopeInner>)> {
        self.inner
            .upgrade()
            .map(|inner| inner.take_invalidated_scopes())
            .unwrap_or_default()
    }

    pub fn has_invalid_scopes(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_invalid_scopes())
            .unwrap_or(false)
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    /// No invalid scopes, queued tasks, frame callbacks or undelivered messages.
    /// Background threads still running are reported by
    /// [`RuntimeHandle::has_background_work`].
    pub fn is_idle(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.is_idle())
            .unwrap_or(true)
    }

    pub fn set_needs_frame(&self, value: bool) {
        if let Some(inner) = self.inner.upgrade() {
            inner.needs_frame.set(value);
        }
    }

    pub fn assert_ui_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "state mutated off the runtime's UI thread"
        );
    }

    pub fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl RuntimeTaskWaker {
    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.scheduler.schedule_frame();
    }
}
