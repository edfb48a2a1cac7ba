use std::cell::RefCell;
use std::rc::Rc;

use crate::composer::{Composer, ComposerCore};

thread_local! {
    static COMPOSER_STACK: RefCell<Vec<Rc<ComposerCore>>> = const { RefCell::new(Vec::new()) };
}

/// Pops the composer stack on drop.
#[must_use = "ComposerScopeGuard pops the composer stack on drop"]
pub struct ComposerScopeGuard;

impl Drop for ComposerScopeGuard {
    fn drop(&mut self) {
        COMPOSER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Makes `composer` the current composer until the guard is dropped.
pub fn enter(composer: &Composer) -> ComposerScopeGuard {
    COMPOSER_STACK.with(|stack| stack.borrow_mut().push(composer.clone_core()));
    ComposerScopeGuard
}

/// Access the current composer.
///
/// # Panics
/// Panics when called outside of a composition.
pub fn with_composer<R>(f: impl FnOnce(&Composer) -> R) -> R {
    match try_with_composer(f) {
        Some(result) => result,
        None => panic!("composable function called outside of a composition"),
    }
}

/// Like [`with_composer`] but returns `None` outside of a composition.
pub fn try_with_composer<R>(f: impl FnOnce(&Composer) -> R) -> Option<R> {
    let core = COMPOSER_STACK.with(|stack| stack.borrow().last().cloned())?;
    Some(f(&Composer::from_core(core)))
}
