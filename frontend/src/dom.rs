//! Capability traits the interaction logic is written against.
//!
//! Every behavior module only talks to the page through these traits, so the
//! same code drives the real document (see `browser`) and the in-memory page
//! used by the tests.

use std::collections::BTreeMap;
use std::fmt;

/// Element handle type shared by all capabilities.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug + 'static;
}

/// Finding elements. Lookups that fail for any reason (including an invalid
/// selector) report "not found".
pub trait ElementLookup: Dom {
    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;
    fn query_all_within(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;
    /// Nearest ancestor-or-self matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
}

pub trait ClassToggle: Dom {
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_class(&self, node: &Self::Node, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }
}

/// Inline style writes. Property names are CSS names (`transition-delay`).
pub trait StyleWriter: Dom {
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    fn set_styles(&self, node: &Self::Node, declarations: &[(&str, &str)]) {
        for (property, value) in declarations {
            self.set_style(node, property, value);
        }
    }
}

pub trait Geometry: Dom {
    fn bounding_rect(&self, node: &Self::Node) -> Rect;
    fn offset_top(&self, node: &Self::Node) -> f64;
    fn viewport_height(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);
}

pub trait FormControls: Dom {
    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    fn form_values(&self, form: &Self::Node) -> FormValues;
    fn reset_form(&self, form: &Self::Node);
}

pub trait NodeTree: Dom {
    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn append_to_body(&self, node: &Self::Node);
    fn remove(&self, node: &Self::Node);
}

/// One visibility change reported by an observer.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing<N> {
    pub target: N,
    pub intersecting: bool,
}

/// Returned by observer callbacks to keep watching or stop for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Continue,
    Disconnect,
}

pub type CrossingCallback<N> = Box<dyn FnMut(&[Crossing<N>]) -> Observation>;

pub trait VisibilityObserver: Dom {
    /// Watches `targets` and calls `on_cross` whenever one of them crosses
    /// `threshold` (fraction of the element that is on screen).
    fn observe(&self, targets: &[Self::Node], threshold: f64, on_cross: CrossingCallback<Self::Node>);
}

/// Everything the controller needs from a page.
pub trait Page:
    ElementLookup
    + ClassToggle
    + StyleWriter
    + Geometry
    + FormControls
    + NodeTree
    + VisibilityObserver
    + Clone
    + 'static
{
}

impl<T> Page for T where
    T: ElementLookup
        + ClassToggle
        + StyleWriter
        + Geometry
        + FormControls
        + NodeTree
        + VisibilityObserver
        + Clone
        + 'static
{
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Submitted form fields. A repeated field name keeps its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The value of `name` unless it is absent or empty.
    pub fn filled(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::default();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// Formats a duration in seconds as a CSS time value, rounded to the
/// millisecond so `3 * 0.1` renders as `0.3s`.
pub fn css_seconds(seconds: f64) -> String {
    let rounded = (seconds * 1000.0).round() / 1000.0;
    format!("{}s", rounded)
}

/// Stagger offset in milliseconds for the `index`-th element of a cascade.
pub fn stagger_ms(base_ms: u32, step_ms: u32, index: usize) -> u32 {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    base_ms.saturating_add(step_ms.saturating_mul(index))
}
