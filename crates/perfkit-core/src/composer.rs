use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::composer_context;
use crate::element::{Element, ViewNode, ViewTree};
use crate::hash::{hash_key, Key};
use crate::local::{LocalContext, LocalKey, ProvidedValue};
use crate::owned::Owned;
use crate::runtime::{Runtime, RuntimeHandle};
use crate::scope::{RecomposeCallback, RecomposeScope};
use crate::ComposeError;

pub(crate) type GroupHandle = Rc<RefCell<GroupData>>;
pub(crate) type WeakGroup = Weak<RefCell<GroupData>>;

/// Salt mixed into keys passed to [`Composer::with_key`] so they cannot
/// collide with call-site keys.
const EXPLICIT_KEY_SALT: Key = 0x5EED_0F_4B_E7_A1_u64;

const PROVIDER_GROUP_KEY: Key = 0xC0_7E_47_10_CA_1u64;

/// Upper bound on recomposition passes in one `process_invalid_scopes`.
const MAX_RECOMPOSE_PASSES: usize = 256;

pub(crate) enum Child {
    Group(GroupHandle),
    Leaf(Element),
    /// Placeholder for a group claimed by the running body.
    Taken,
}

pub(crate) struct GroupData {
    key: Key,
    slots: Vec<Box<dyn Any>>,
    children: Vec<Child>,
    host: Option<Element>,
    scope: Option<RecomposeScope>,
    params: Option<Box<dyn Any>>,
}

impl GroupData {
    fn new(key: Key) -> Self {
        Self {
            key,
            slots: Vec::new(),
            children: Vec::new(),
            host: None,
            scope: None,
            params: None,
        }
    }
}

fn dispose_group(group: &GroupHandle) {
    let (children, slots, scope, params) = {
        let mut data = group.borrow_mut();
        (
            std::mem::take(&mut data.children),
            std::mem::take(&mut data.slots),
            data.scope.take(),
            data.params.take(),
        )
    };
    if let Some(scope) = scope {
        scope.deactivate();
    }
    for child in children {
        if let Child::Group(child) = child {
            dispose_group(&child);
        }
    }
    // Remembered values go last-in first-out, like locals on a stack.
    for slot in slots.into_iter().rev() {
        drop(slot);
    }
    drop(params);
}

struct Frame {
    group: GroupHandle,
    previous: Vec<Child>,
    emitted: Vec<Child>,
    discarded: Vec<Child>,
    slot_cursor: usize,
    scope: Option<RecomposeScope>,
    depth: usize,
}

pub struct ComposerCore {
    runtime: RuntimeHandle,
    frames: RefCell<Vec<Frame>>,
    locals: RefCell<LocalContext>,
    side_effects: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Executes composable code against the group tree.
#[derive(Clone)]
pub struct Composer {
    core: Rc<ComposerCore>,
}

impl Composer {
    pub(crate) fn new(runtime: RuntimeHandle) -> Self {
        Self {
            core: Rc::new(ComposerCore {
                runtime,
                frames: RefCell::new(Vec::new()),
                locals: RefCell::new(LocalContext::default()),
                side_effects: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn clone_core(&self) -> Rc<ComposerCore> {
        Rc::clone(&self.core)
    }

    pub(crate) fn from_core(core: Rc<ComposerCore>) -> Self {
        Self { core }
    }

    pub fn install<R>(&self, f: impl FnOnce(&Composer) -> R) -> R {
        let _guard = composer_context::enter(self);
        f(self)
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.core.runtime.clone()
    }

    fn current_depth(&self) -> usize {
        self.core
            .frames
            .borrow()
            .last()
            .map(|frame| frame.depth)
            .unwrap_or(0)
    }

    /// The innermost restartable scope, which state reads subscribe.
    pub fn current_recompose_scope(&self) -> Option<RecomposeScope> {
        self.core
            .frames
            .borrow()
            .iter()
            .rev()
            .find_map(|frame| frame.scope.clone())
    }

    /// Claims the next child group with `key`, reusing the previous
    /// composition's group when one is available.
    fn claim_child_group(&self, key: Key) -> GroupHandle {
        let mut frames = self.core.frames.borrow_mut();
        let Some(frame) = frames.last_mut() else {
            log::warn!("group {key:#x} started outside of any parent group");
            return Rc::new(RefCell::new(GroupData::new(key)));
        };
        let reused = frame.previous.iter_mut().find_map(|child| {
            let matches = matches!(child, Child::Group(group) if group.borrow().key == key);
            if !matches {
                return None;
            }
            match std::mem::replace(child, Child::Taken) {
                Child::Group(group) => Some(group),
                _ => None,
            }
        });
        let group = reused.unwrap_or_else(|| Rc::new(RefCell::new(GroupData::new(key))));
        frame.emitted.push(Child::Group(Rc::clone(&group)));
        group
    }

    fn run_body<R>(
        &self,
        group: &GroupHandle,
        scope: Option<RecomposeScope>,
        depth: usize,
        body: impl FnOnce(&Composer) -> R,
    ) -> R {
        let previous = std::mem::take(&mut group.borrow_mut().children);
        if let Some(scope) = &scope {
            scope.mark_recomposed();
            scope.snapshot_locals(&self.core.locals.borrow());
        }
        self.core.frames.borrow_mut().push(Frame {
            group: Rc::clone(group),
            previous,
            emitted: Vec::new(),
            discarded: Vec::new(),
            slot_cursor: 0,
            scope,
            depth,
        });
        let result = body(self);
        let frame = self.core.frames.borrow_mut().pop();
        match frame {
            Some(frame) => Self::finish_frame(frame),
            None => log::error!("composer frame stack underflow"),
        }
        result
    }

    fn finish_frame(frame: Frame) {
        let Frame {
            group,
            previous,
            emitted,
            discarded,
            slot_cursor,
            ..
        } = frame;
        let stale_slots = {
            let mut data = group.borrow_mut();
            data.children = emitted;
            if data.slots.len() > slot_cursor {
                data.slots.split_off(slot_cursor)
            } else {
                Vec::new()
            }
        };
        for child in previous.into_iter().chain(discarded) {
            if let Child::Group(group) = child {
                dispose_group(&group);
            }
        }
        drop(stale_slots);
    }

    /// Runs `content` in a non-restartable group identified by `key`.
    pub fn with_group<R>(&self, key: Key, content: impl FnOnce(&Composer) -> R) -> R {
        let group = self.claim_child_group(key);
        let depth = self.current_depth() + 1;
        self.run_body(&group, None, depth, content)
    }

    /// Runs `content` in a group keyed by a caller-provided identity, used to
    /// keep per-item state attached to items in loops.
    pub fn with_key<K: std::hash::Hash + ?Sized, R>(
        &self,
        key: &K,
        content: impl FnOnce(&Composer) -> R,
    ) -> R {
        self.with_group(hash_key(key) ^ EXPLICIT_KEY_SALT, content)
    }

    /// Restartable group that is skipped while `props` equal the props of the
    /// previous run and nothing it read has changed.
    pub fn memo<P>(&self, key: Key, props: P, content: Rc<dyn Fn(&P)>)
    where
        P: PartialEq + Clone + 'static,
    {
        let callback_props = props.clone();
        let callback: RecomposeCallback = Rc::new(move |_: &Composer| content(&callback_props));
        self.restartable_group(
            key,
            move |data| {
                let unchanged = data
                    .params
                    .as_ref()
                    .and_then(|params| params.downcast_ref::<P>())
                    .is_some_and(|previous| previous == &props);
                if !unchanged {
                    data.params = Some(Box::new(props));
                }
                unchanged
            },
            callback,
        );
    }

    /// Restartable group that runs whenever its parent runs.
    pub fn restartable(&self, key: Key, content: Rc<dyn Fn()>) {
        let callback: RecomposeCallback = Rc::new(move |_: &Composer| content());
        self.restartable_group(key, |_| false, callback);
    }

    fn restartable_group(
        &self,
        key: Key,
        props_unchanged: impl FnOnce(&mut GroupData) -> bool,
        callback: RecomposeCallback,
    ) {
        let group = self.claim_child_group(key);
        let depth = self.current_depth() + 1;
        let (scope, skip) = {
            let mut data = group.borrow_mut();
            let is_new = data.scope.is_none();
            let scope = data
                .scope
                .get_or_insert_with(|| RecomposeScope::new(self.runtime_handle(), depth))
                .clone();
            let unchanged = props_unchanged(&mut data);
            let skip = !is_new && unchanged && !scope.is_invalid();
            (scope, skip)
        };
        if skip {
            return;
        }
        scope.attach_group(&group);
        scope.set_recompose(Rc::clone(&callback));
        self.run_body(&group, Some(scope), depth, |composer| callback(composer));
    }

    /// Re-executes an invalid scope on its own.
    pub(crate) fn recompose_scope(&self, scope: &RecomposeScope) {
        if !scope.is_active() || !scope.is_invalid() {
            return;
        }
        let Some(group) = scope.group() else {
            scope.deactivate();
            return;
        };
        let Some(callback) = scope.recompose_callback() else {
            return;
        };
        log::debug!("recomposing scope {} at depth {}", scope.id(), scope.depth());
        *self.core.locals.borrow_mut() = scope.locals();
        self.run_body(&group, Some(scope.clone()), scope.depth(), |composer| {
            callback(composer)
        });
    }

    /// Returns the value remembered at the current position, creating it with
    /// `init` on first composition.
    pub fn remember<T: 'static>(&self, init: impl FnOnce() -> T) -> Owned<T> {
        let position = {
            let mut frames = self.core.frames.borrow_mut();
            frames.last_mut().map(|frame| {
                let index = frame.slot_cursor;
                frame.slot_cursor += 1;
                (Rc::clone(&frame.group), index)
            })
        };
        let Some((group, index)) = position else {
            return Owned::new(init());
        };
        if let Some(existing) = group
            .borrow()
            .slots
            .get(index)
            .and_then(|slot| slot.downcast_ref::<Owned<T>>())
        {
            return existing.clone();
        }
        let owned = Owned::new(init());
        let replaced = {
            let mut data = group.borrow_mut();
            if index < data.slots.len() {
                Some(std::mem::replace(
                    &mut data.slots[index],
                    Box::new(owned.clone()),
                ))
            } else {
                data.slots.push(Box::new(owned.clone()));
                None
            }
        };
        drop(replaced);
        owned
    }

    /// Appends a leaf element to the output of the current group.
    pub fn emit(&self, element: Element) {
        let mut frames = self.core.frames.borrow_mut();
        match frames.last_mut() {
            Some(frame) => frame.emitted.push(Child::Leaf(element)),
            None => log::warn!("element emitted outside of any group"),
        }
    }

    /// Emits `element` with the output of `content` nested inside it.
    pub fn container<R>(
        &self,
        key: Key,
        element: Element,
        content: impl FnOnce(&Composer) -> R,
    ) -> R {
        self.with_group(key, |composer| {
            composer.set_host(element);
            content(composer)
        })
    }

    fn set_host(&self, element: Element) {
        let frames = self.core.frames.borrow();
        if let Some(frame) = frames.last() {
            frame.group.borrow_mut().host = Some(element);
        }
    }

    /// Drops everything the current group emitted so far. Groups created or
    /// reused by the dropped output are disposed when the group finishes.
    pub fn discard_emitted(&self) {
        let mut frames = self.core.frames.borrow_mut();
        if let Some(frame) = frames.last_mut() {
            let emitted = std::mem::take(&mut frame.emitted);
            frame.discarded.extend(emitted);
        }
    }

    pub fn with_composition_locals<R>(
        &self,
        provided: Vec<ProvidedValue>,
        content: impl FnOnce(&Composer) -> R,
    ) -> R {
        self.with_group(PROVIDER_GROUP_KEY, |composer| {
            let entries: Vec<_> = provided
                .into_iter()
                .map(|value| value.into_entry(composer))
                .collect();
            let parent = composer.core.locals.borrow().clone();
            *composer.core.locals.borrow_mut() = parent.with_entries(entries);
            let result = content(composer);
            *composer.core.locals.borrow_mut() = parent;
            result
        })
    }

    pub(crate) fn read_local(&self, key: LocalKey) -> Option<Rc<dyn Any>> {
        self.core.locals.borrow().get(key)
    }

    /// Queues `effect` to run once the current pass has been applied.
    pub fn register_side_effect(&self, effect: impl FnOnce() + 'static) {
        self.core.side_effects.borrow_mut().push(Box::new(effect));
    }

    fn take_side_effects(&self) -> Vec<Box<dyn FnOnce()>> {
        std::mem::take(&mut *self.core.side_effects.borrow_mut())
    }
}

/// A composition: the group tree plus the runtime that keeps it up to date.
pub struct Composition {
    runtime: Runtime,
    root: GroupHandle,
    root_scope: RecomposeScope,
    has_content: bool,
}

impl Composition {
    pub fn new() -> Self {
        Self::with_runtime(Runtime::default())
    }

    pub fn with_runtime(runtime: Runtime) -> Self {
        let root = Rc::new(RefCell::new(GroupData::new(0)));
        let root_scope = RecomposeScope::new(runtime.handle(), 0);
        root_scope.attach_group(&root);
        root.borrow_mut().scope = Some(root_scope.clone());
        Self {
            runtime,
            root,
            root_scope,
            has_content: false,
        }
    }

    /// Installs `content` as the root of the composition and renders it.
    pub fn set_content(&mut self, content: impl FnMut() + 'static) -> Result<(), ComposeError> {
        let content = RefCell::new(content);
        self.root_scope
            .set_recompose(Rc::new(move |_: &Composer| (content.borrow_mut())()));
        self.has_content = true;
        self.render()
    }

    /// Re-runs the root content, then settles every invalidated scope.
    pub fn render(&mut self) -> Result<(), ComposeError> {
        if !self.has_content {
            return Err(ComposeError::NoContent);
        }
        self.runtime_handle().drain_ui();
        self.root_scope.invalidate();
        self.process_invalid_scopes()?;
        Ok(())
    }

    pub fn should_render(&self) -> bool {
        self.runtime.needs_frame()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Recomposes invalid scopes, shallowest first, until none are left.
    /// Returns whether anything was recomposed.
    pub fn process_invalid_scopes(&mut self) -> Result<bool, ComposeError> {
        let handle = self.runtime_handle();
        let mut did_recompose = false;
        let mut passes = 0;
        loop {
            handle.drain_ui();
            let pending = handle.take_invalidated_scopes();
            if pending.is_empty() {
                break;
            }
            passes += 1;
            if passes > MAX_RECOMPOSE_PASSES {
                return Err(ComposeError::RecomposeLoop { passes });
            }
            let mut scopes: Vec<RecomposeScope> = Vec::with_capacity(pending.len());
            for (id, weak) in pending {
                match weak.upgrade() {
                    Some(inner) => scopes.push(RecomposeScope::from_inner(inner)),
                    None => handle.mark_scope_recomposed(id),
                }
            }
            if scopes.is_empty() {
                continue;
            }
            scopes.sort_by_key(RecomposeScope::depth);
            did_recompose = true;
            log::debug!("recomposition pass {passes}: {} invalid scopes", scopes.len());
            let composer = Composer::new(handle.clone());
            let side_effects = composer.install(|composer| {
                for scope in &scopes {
                    composer.recompose_scope(scope);
                }
                composer.take_side_effects()
            });
            for effect in side_effects {
                effect();
            }
        }
        if handle.is_idle() {
            self.runtime.set_needs_frame(false);
        }
        Ok(did_recompose)
    }

    /// Snapshot of the emitted elements.
    pub fn view_tree(&self) -> ViewTree {
        let mut roots = Vec::new();
        collect_nodes(&self.root, &mut roots);
        ViewTree::new(roots)
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Composition {
    fn drop(&mut self) {
        dispose_group(&self.root);
    }
}

fn collect_nodes(group: &GroupHandle, out: &mut Vec<ViewNode>) {
    let data = group.borrow();
    match &data.host {
        Some(host) => {
            let mut children = Vec::new();
            collect_children(&data.children, &mut children);
            out.push(ViewNode::new(host.clone(), children));
        }
        None => collect_children(&data.children, out),
    }
}

fn collect_children(children: &[Child], out: &mut Vec<ViewNode>) {
    for child in children {
        match child {
            Child::Group(group) => collect_nodes(group, out),
            Child::Leaf(element) => out.push(ViewNode::new(element.clone(), Vec::new())),
            Child::Taken => {}
        }
    }
}
