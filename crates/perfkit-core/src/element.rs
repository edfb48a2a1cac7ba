//! Output of a composition: a tree of lightweight elements with attached
//! event handlers.

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Column,
    Row,
    Box,
    Text,
    Button,
    Checkbox,
    Input,
    Label,
    Form,
    List,
    ListItem,
    Spacer,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Column => "column",
            ElementKind::Row => "row",
            ElementKind::Box => "box",
            ElementKind::Text => "text",
            ElementKind::Button => "button",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Input => "input",
            ElementKind::Label => "label",
            ElementKind::Form => "form",
            ElementKind::List => "list",
            ElementKind::ListItem => "list-item",
            ElementKind::Spacer => "spacer",
        }
    }
}

/// Keys the harness can deliver to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// An event delivered to an element's handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Click,
    Input(String),
    Hover,
    Focus,
    Blur,
    Scroll(f32),
    Key(KeyPress),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Click => "click",
            UiEvent::Input(_) => "input",
            UiEvent::Hover => "hover",
            UiEvent::Focus => "focus",
            UiEvent::Blur => "blur",
            UiEvent::Scroll(_) => "scroll",
            UiEvent::Key(_) => "key",
        }
    }
}

pub type Callback = Rc<dyn Fn()>;
pub type TextCallback = Rc<dyn Fn(String)>;
pub type ScrollCallback = Rc<dyn Fn(f32)>;
pub type KeyCallback = Rc<dyn Fn(KeyPress)>;

#[derive(Clone, Default)]
pub struct Handlers {
    pub click: Option<Callback>,
    pub input: Option<TextCallback>,
    pub hover: Option<Callback>,
    pub focus: Option<Callback>,
    pub blur: Option<Callback>,
    pub scroll: Option<ScrollCallback>,
    pub key: Option<KeyCallback>,
}

pub type Attributes = SmallVec<[(Cow<'static, str>, String); 4]>;

/// One emitted element.
#[derive(Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub text: Option<String>,
    pub test_tag: Option<String>,
    pub attrs: Attributes,
    pub handlers: Handlers,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            text: None,
            test_tag: None,
            attrs: SmallVec::new(),
            handlers: Handlers::default(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn test_tag(mut self, tag: impl Into<String>) -> Self {
        self.test_tag = Some(tag.into());
        self
    }

    /// Sets an attribute, replacing an earlier value under the same name.
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn on_click(mut self, handler: impl Fn() + 'static) -> Self {
        self.handlers.click = Some(Rc::new(handler));
        self
    }

    pub fn on_input(mut self, handler: impl Fn(String) + 'static) -> Self {
        self.handlers.input = Some(Rc::new(handler));
        self
    }

    pub fn on_hover(mut self, handler: impl Fn() + 'static) -> Self {
        self.handlers.hover = Some(Rc::new(handler));
        self
    }

    pub fn on_focus(mut self, handler: impl Fn() + 'static) -> Self {
        self.handlers.focus = Some(Rc::new(handler));
        self
    }

    pub fn on_blur(mut self, handler: impl Fn() + 'static) -> Self {
        self.handlers.blur = Some(Rc::new(handler));
        self
    }

    pub fn on_scroll(mut self, handler: impl Fn(f32) + 'static) -> Self {
        self.handlers.scroll = Some(Rc::new(handler));
        self
    }

    pub fn on_key(mut self, handler: impl Fn(KeyPress) + 'static) -> Self {
        self.handlers.key = Some(Rc::new(handler));
        self
    }

    /// Invokes the handler matching `event`. Returns `false` when the element
    /// has no handler for it.
    pub fn dispatch(&self, event: UiEvent) -> bool {
        let handlers = &self.handlers;
        match event {
            UiEvent::Click => handlers.click.as_ref().map(|handler| handler()).is_some(),
            UiEvent::Input(text) => handlers.input.as_ref().map(|handler| handler(text)).is_some(),
            UiEvent::Hover => handlers.hover.as_ref().map(|handler| handler()).is_some(),
            UiEvent::Focus => handlers.focus.as_ref().map(|handler| handler()).is_some(),
            UiEvent::Blur => handlers.blur.as_ref().map(|handler| handler()).is_some(),
            UiEvent::Scroll(offset) => handlers
                .scroll
                .as_ref()
                .map(|handler| handler(offset))
                .is_some(),
            UiEvent::Key(key) => handlers.key.as_ref().map(|handler| handler(key)).is_some(),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("test_tag", &self.test_tag)
            .field("attrs", &self.attrs)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(tag) = &self.test_tag {
            write!(f, "#{tag}")?;
        }
        if let Some(text) = &self.text {
            write!(f, " {text:?}")?;
        }
        for (name, value) in &self.attrs {
            write!(f, " {name}={value:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ViewNode {
    pub element: Element,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    pub fn new(element: Element, children: Vec<ViewNode>) -> Self {
        Self { element, children }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let Some(text) = &node.element.text {
                out.push_str(text);
            }
        });
        out
    }

    fn walk<'a>(&'a self, f: &mut impl FnMut(&'a ViewNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// Snapshot of a composition's output, taken after a pass.
#[derive(Debug, Clone, Default)]
pub struct ViewTree {
    roots: Vec<ViewNode>,
}

impl ViewTree {
    pub fn new(roots: Vec<ViewNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[ViewNode] {
        &self.roots
    }

    /// Depth-first, pre-order.
    pub fn nodes(&self) -> Vec<&ViewNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.walk(&mut |node| out.push(node));
        }
        out
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&ViewNode> {
        self.nodes()
            .into_iter()
            .find(|node| node.element.test_tag.as_deref() == Some(tag))
    }

    pub fn find_by_text(&self, text: &str) -> Option<&ViewNode> {
        self.nodes()
            .into_iter()
            .find(|node| node.element.text.as_deref() == Some(text))
    }

    pub fn find_all(&self, predicate: impl Fn(&ViewNode) -> bool) -> Vec<&ViewNode> {
        self.nodes().into_iter().filter(|node| predicate(node)).collect()
    }

    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.find_all(|node| node.element.kind == kind).len()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.find_by_text(text).is_some()
    }

    /// Indented, one element per line.
    pub fn dump(&self) -> String {
        fn dump_node(node: &ViewNode, depth: usize, out: &mut String) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.element.to_string());
            out.push('\n');
            for child in &node.children {
                dump_node(child, depth + 1, out);
            }
        }
        let mut out = String::new();
        for root in &self.roots {
            dump_node(root, 0, &mut out);
        }
        out
    }
}
