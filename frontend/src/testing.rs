//! In-memory page and virtual clock used by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::dom::{
    ClassToggle, Crossing, CrossingCallback, Dom, ElementLookup, FormControls, FormValues,
    Geometry, NodeTree, Observation, Rect, StyleWriter, VisibilityObserver,
};
use crate::scheduler::{Scheduler, Task, TaskId, TaskOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Default)]
struct FakeElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    // Compound selectors (`.menu-links a`) the element should answer to.
    selectors: Vec<String>,
    parent: Option<NodeId>,
    attached: bool,
    styles: BTreeMap<String, String>,
    text: String,
    disabled: bool,
    fields: Vec<(String, String)>,
    rect: Rect,
    offset_top: f64,
    resets: usize,
}

struct FakeObserver {
    targets: Vec<NodeId>,
    threshold: f64,
    callback: Option<CrossingCallback<NodeId>>,
    connected: bool,
    intersecting: HashMap<NodeId, bool>,
}

#[derive(Default)]
struct FakeDom {
    elements: Vec<FakeElement>,
    viewport_height: f64,
    scrolls: Vec<f64>,
    observers: Vec<FakeObserver>,
}

impl FakeDom {
    fn el(&self, node: NodeId) -> &FakeElement {
        &self.elements[node.0]
    }

    fn el_mut(&mut self, node: NodeId) -> &mut FakeElement {
        &mut self.elements[node.0]
    }

    fn in_document(&self, node: NodeId) -> bool {
        let el = self.el(node);
        el.attached && el.parent.map_or(true, |parent| self.in_document(parent))
    }

    fn is_descendant(&self, node: NodeId, scope: NodeId) -> bool {
        let mut current = self.el(node).parent;
        while let Some(parent) = current {
            if parent == scope {
                return true;
            }
            current = self.el(parent).parent;
        }
        false
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .any(|single| self.matches_single(node, single))
    }

    fn matches_single(&self, node: NodeId, selector: &str) -> bool {
        let el = self.el(node);
        if el.selectors.iter().any(|s| s == selector) {
            return true;
        }
        let simple = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if let Some(id) = selector.strip_prefix('#') {
            simple(id) && el.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            simple(class) && el.classes.iter().any(|c| c == class)
        } else {
            simple(selector) && el.tag == selector
        }
    }

    fn find_all(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        (0..self.elements.len())
            .map(NodeId)
            .filter(|&node| self.in_document(node) || scope.is_some())
            .filter(|&node| scope.map_or(true, |scope| self.is_descendant(node, scope)))
            .filter(|&node| self.matches(node, selector))
            .collect()
    }
}

/// Element tree with just enough behavior for the interaction code.
#[derive(Clone, Default)]
pub struct FakePage {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakePage {
    pub fn new() -> Self {
        let page = Self::default();
        page.set_viewport_height(800.0);
        page
    }

    /// Adds an element in the document, under `parent` or at the top level.
    pub fn insert(&self, parent: Option<NodeId>, tag: &str, classes: &[&str]) -> NodeId {
        let mut dom = self.dom.borrow_mut();
        let node = NodeId(dom.elements.len());
        dom.elements.push(FakeElement {
            tag: tag.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            parent,
            attached: true,
            ..FakeElement::default()
        });
        node
    }

    pub fn set_id(&self, node: NodeId, id: &str) {
        self.dom.borrow_mut().el_mut(node).id = Some(id.to_string());
    }

    pub fn add_selector(&self, node: NodeId, selector: &str) {
        self.dom.borrow_mut().el_mut(node).selectors.push(selector.to_string());
    }

    pub fn set_text_content(&self, node: NodeId, text: &str) {
        self.dom.borrow_mut().el_mut(node).text = text.to_string();
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        self.dom.borrow_mut().el_mut(node).rect = rect;
    }

    pub fn set_offset(&self, node: NodeId, offset_top: f64) {
        self.dom.borrow_mut().el_mut(node).offset_top = offset_top;
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.dom.borrow_mut().viewport_height = height;
    }

    pub fn set_field(&self, form: NodeId, name: &str, value: &str) {
        self.dom
            .borrow_mut()
            .el_mut(form)
            .fields
            .push((name.to_string(), value.to_string()));
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.dom.borrow().el(node).styles.get(property).cloned()
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.dom.borrow().el(node).disabled
    }

    pub fn resets(&self, node: NodeId) -> usize {
        self.dom.borrow().el(node).resets
    }

    pub fn scrolls(&self) -> Vec<f64> {
        self.dom.borrow().scrolls.clone()
    }

    /// Elements currently in the document matching `selector`.
    pub fn count(&self, selector: &str) -> usize {
        self.dom.borrow().find_all(None, selector).len()
    }

    pub fn connected_observers(&self) -> usize {
        self.dom.borrow().observers.iter().filter(|o| o.connected).count()
    }

    /// Moves `node` so that `ratio` of it is on screen, notifying every
    /// connected observer whose threshold it crosses.
    pub fn set_visibility(&self, node: NodeId, ratio: f64) {
        let count = self.dom.borrow().observers.len();
        for index in 0..count {
            let (callback, crossing) = {
                let mut dom = self.dom.borrow_mut();
                let observer = &mut dom.observers[index];
                if !observer.connected || !observer.targets.contains(&node) {
                    continue;
                }
                let now = ratio >= observer.threshold;
                let before = observer.intersecting.insert(node, now).unwrap_or(false);
                if before == now {
                    continue;
                }
                let Some(callback) = observer.callback.take() else {
                    continue;
                };
                (callback, Crossing { target: node, intersecting: now })
            };

            let mut callback = callback;
            let outcome = callback(&[crossing]);

            let mut dom = self.dom.borrow_mut();
            let observer = &mut dom.observers[index];
            observer.callback = Some(callback);
            if outcome == Observation::Disconnect {
                observer.connected = false;
            }
        }
    }
}

impl Dom for FakePage {
    type Node = NodeId;
}

impl ElementLookup for FakePage {
    fn by_id(&self, id: &str) -> Option<NodeId> {
        let dom = self.dom.borrow();
        (0..dom.elements.len())
            .map(NodeId)
            .find(|&node| dom.in_document(node) && dom.el(node).id.as_deref() == Some(id))
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.dom.borrow().find_all(None, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.query_all_within(scope, selector).into_iter().next()
    }

    fn query_all_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        self.dom.borrow().find_all(Some(*scope), selector)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let dom = self.dom.borrow();
        let mut current = Some(*node);
        while let Some(candidate) = current {
            if dom.matches(candidate, selector) {
                return Some(candidate);
            }
            current = dom.el(candidate).parent;
        }
        None
    }
}

impl ClassToggle for FakePage {
    fn add_class(&self, node: &NodeId, class: &str) {
        let mut dom = self.dom.borrow_mut();
        let classes = &mut dom.el_mut(*node).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.dom.borrow_mut().el_mut(*node).classes.retain(|c| c != class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.dom.borrow().el(*node).classes.iter().any(|c| c == class)
    }
}

impl StyleWriter for FakePage {
    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.dom
            .borrow_mut()
            .el_mut(*node)
            .styles
            .insert(property.to_string(), value.to_string());
    }
}

impl Geometry for FakePage {
    fn bounding_rect(&self, node: &NodeId) -> Rect {
        self.dom.borrow().el(*node).rect
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.dom.borrow().el(*node).offset_top
    }

    fn viewport_height(&self) -> f64 {
        self.dom.borrow().viewport_height
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.dom.borrow_mut().scrolls.push(top);
    }
}

impl FormControls for FakePage {
    fn text(&self, node: &NodeId) -> String {
        self.dom.borrow().el(*node).text.clone()
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.set_text_content(*node, text);
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        self.dom.borrow_mut().el_mut(*node).disabled = disabled;
    }

    fn form_values(&self, form: &NodeId) -> FormValues {
        self.dom.borrow().el(*form).fields.iter().cloned().collect()
    }

    fn reset_form(&self, form: &NodeId) {
        let mut dom = self.dom.borrow_mut();
        let el = dom.el_mut(*form);
        el.fields.clear();
        el.resets += 1;
    }
}

impl NodeTree for FakePage {
    fn create_element(&self, tag: &str) -> Option<NodeId> {
        let node = self.insert(None, tag, &[]);
        self.dom.borrow_mut().el_mut(node).attached = false;
        Some(node)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut dom = self.dom.borrow_mut();
        let el = dom.el_mut(*child);
        el.parent = Some(*parent);
        el.attached = true;
    }

    fn append_to_body(&self, node: &NodeId) {
        let mut dom = self.dom.borrow_mut();
        let el = dom.el_mut(*node);
        el.parent = None;
        el.attached = true;
    }

    fn remove(&self, node: &NodeId) {
        self.dom.borrow_mut().el_mut(*node).attached = false;
    }
}

impl VisibilityObserver for FakePage {
    fn observe(&self, targets: &[NodeId], threshold: f64, on_cross: CrossingCallback<NodeId>) {
        self.dom.borrow_mut().observers.push(FakeObserver {
            targets: targets.to_vec(),
            threshold,
            callback: Some(on_cross),
            connected: true,
            intersecting: HashMap::new(),
        });
    }
}

struct Queued {
    id: TaskId,
    owner: TaskOwner,
    due: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: u64,
    next_id: u64,
    queue: Vec<Queued>,
}

/// Scheduler driven by `advance` instead of wall-clock time.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    /// Runs every task due within the next `ms`, in due order.
    pub fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now + ms;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let position = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, queued)| queued.due <= target)
                    .min_by_key(|(_, queued)| (queued.due, queued.id))
                    .map(|(position, _)| position);
                position.map(|position| {
                    let queued = clock.queue.remove(position);
                    clock.now = queued.due;
                    queued.task
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.clock.borrow_mut().now = target;
    }

    pub fn pending_total(&self) -> usize {
        self.clock.borrow().queue.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, owner: TaskOwner, delay_ms: u32, task: Task) {
        let mut clock = self.clock.borrow_mut();
        let id = TaskId::new(clock.next_id);
        clock.next_id += 1;
        let due = clock.now + u64::from(delay_ms);
        clock.queue.push(Queued { id, owner, due, task });
    }

    fn cancel(&self, owner: TaskOwner) -> usize {
        let mut clock = self.clock.borrow_mut();
        let before = clock.queue.len();
        clock.queue.retain(|queued| queued.owner != owner);
        before - clock.queue.len()
    }

    fn pending(&self, owner: TaskOwner) -> usize {
        self.clock
            .borrow()
            .queue
            .iter()
            .filter(|queued| queued.owner == owner)
            .count()
    }
}
