#![allow(non_snake_case)]

use perfkit_core::{group, with_current_composer, Element, ElementKind};
use perfkit_foundation::{LoadError, Suspended};

/// Renders `content`, or `fallback` while something it reads is still
/// loading.
///
/// `content` reports suspension by returning [`Suspended`], usually through
/// `?` on [`LazyModule::suspend`](perfkit_foundation::LazyModule::suspend).
/// Whatever it emitted before suspending is dropped. The nearest restartable
/// scope re-runs once the load lands. A failed load renders its error.
#[track_caller]
pub fn Suspense(fallback: impl FnOnce(), content: impl FnOnce() -> Result<(), Suspended>) {
    SuspenseWithError(
        fallback,
        |err: &LoadError| {
            perfkit_core::emit(
                Element::new(ElementKind::Text)
                    .test_tag("suspense-error")
                    .text(err.to_string()),
            );
        },
        content,
    );
}

/// [`Suspense`] with a custom error view, for example one offering a retry.
#[track_caller]
pub fn SuspenseWithError(
    fallback: impl FnOnce(),
    on_error: impl FnOnce(&LoadError),
    content: impl FnOnce() -> Result<(), Suspended>,
) {
    group(move || match content() {
        Ok(()) => {}
        Err(Suspended::Pending { module }) => {
            log::trace!("suspended on {module}");
            with_current_composer(|composer| composer.discard_emitted());
            fallback();
        }
        Err(Suspended::Failed(err)) => {
            with_current_composer(|composer| composer.discard_emitted());
            on_error(&err);
        }
    });
}
