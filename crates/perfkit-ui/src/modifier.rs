use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use perfkit_core::element::Attributes;
use perfkit_core::{Element, KeyPress};
use smallvec::SmallVec;

/// Decorations applied to a widget's element: a test tag, extra attributes
/// and the pointer/focus/keyboard handlers a widget does not own itself.
#[derive(Clone, Default)]
pub struct Modifier {
    test_tag: Option<String>,
    attrs: Attributes,
    on_hover: Option<Rc<dyn Fn()>>,
    on_focus: Option<Rc<dyn Fn()>>,
    on_blur: Option<Rc<dyn Fn()>>,
    on_key: Option<Rc<dyn Fn(KeyPress)>>,
}

impl Modifier {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn test_tag(mut self, tag: impl Into<String>) -> Self {
        self.test_tag = Some(tag.into());
        self
    }

    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        let name = name.into();
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn attrs<'a>(mut self, attrs: impl IntoIterator<Item = &'a (&'static str, String)>) -> Self {
        for (name, value) in attrs {
            self = self.attr(*name, value);
        }
        self
    }

    pub fn on_hover(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_hover = Some(Rc::new(handler));
        self
    }

    pub fn on_focus(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_focus = Some(Rc::new(handler));
        self
    }

    pub fn on_blur(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_blur = Some(Rc::new(handler));
        self
    }

    pub fn on_key(mut self, handler: impl Fn(KeyPress) + 'static) -> Self {
        self.on_key = Some(Rc::new(handler));
        self
    }

    /// Copies everything onto `element`. Handlers the widget already set win.
    pub(crate) fn apply(self, mut element: Element) -> Element {
        if let Some(tag) = self.test_tag {
            element.test_tag = Some(tag);
        }
        for (name, value) in self.attrs {
            element.set_attr(name, value);
        }
        let handlers = &mut element.handlers;
        handlers.hover = handlers.hover.take().or(self.on_hover);
        handlers.focus = handlers.focus.take().or(self.on_focus);
        handlers.blur = handlers.blur.take().or(self.on_blur);
        handlers.key = handlers.key.take().or(self.on_key);
        element
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: SmallVec<[&str; 4]> = [
            ("hover", self.on_hover.is_some()),
            ("focus", self.on_focus.is_some()),
            ("blur", self.on_blur.is_some()),
            ("key", self.on_key.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        f.debug_struct("Modifier")
            .field("test_tag", &self.test_tag)
            .field("attrs", &self.attrs)
            .field("handlers", &handlers)
            .finish()
    }
}
