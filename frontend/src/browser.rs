//! `web-sys` implementation of the page capabilities, and the listener
//! wiring that turns browser events into `PageEvent`s.

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{self, Array};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, FormData, HtmlButtonElement,
    HtmlElement, HtmlFormElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent, NodeList, ScrollBehavior,
    ScrollToOptions, TouchEvent, Window,
};

use crate::anchors::ANCHOR_SELECTOR;
use crate::controller::{Controller, PageEvent};
use crate::dom::{
    ClassToggle, Crossing, CrossingCallback, Dom, ElementLookup, FormControls, FormValues,
    Geometry, NodeTree, Observation, Rect, StyleWriter, VisibilityObserver,
};
use crate::menu::{MENU_BUTTON_ID, MENU_LINK_SELECTOR};
use crate::scheduler::Scheduler;

/// The live document.
#[derive(Clone)]
pub struct BrowserPage {
    window: Window,
    document: Document,
}

impl BrowserPage {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn load_finished(&self) -> bool {
        self.document.ready_state() == "complete"
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Dom for BrowserPage {
    type Node = Element;
}

impl ElementLookup for BrowserPage {
    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn query_all_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        scope
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }
}

impl ClassToggle for BrowserPage {
    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }
}

impl StyleWriter for BrowserPage {
    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let _ = element.style().set_property(property, value);
        }
    }
}

impl Geometry for BrowserPage {
    fn bounding_rect(&self, node: &Element) -> Rect {
        let rect = node.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn offset_top(&self, node: &Element) -> f64 {
        node.dyn_ref::<HtmlElement>()
            .map(|element| f64::from(element.offset_top()))
            .unwrap_or_default()
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or_default()
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

impl FormControls for BrowserPage {
    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        }
    }

    fn form_values(&self, form: &Element) -> FormValues {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return FormValues::default();
        };
        let Ok(data) = FormData::new_with_form(form) else {
            return FormValues::default();
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else {
            return FormValues::default();
        };

        let mut values = FormValues::default();
        for entry in entries.flatten() {
            let pair = Array::from(&entry);
            // File inputs yield Blobs, which are not text fields.
            if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                values.insert(name, value);
            }
        }
        values
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }
}

impl NodeTree for BrowserPage {
    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn append_to_body(&self, node: &Element) {
        if let Some(body) = self.document.body() {
            let _ = body.append_child(node);
        }
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }
}

impl VisibilityObserver for BrowserPage {
    fn observe(&self, targets: &[Element], threshold: f64, mut on_cross: CrossingCallback<Element>) {
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            let crossings: Vec<Crossing<Element>> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| Crossing {
                    target: entry.target(),
                    intersecting: entry.is_intersecting(),
                })
                .collect();
            if on_cross(&crossings) == Observation::Disconnect {
                observer.disconnect();
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));

        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
            Ok(observer) => {
                for target in targets {
                    observer.observe(target);
                }
                // Lives as long as the page.
                callback.forget();
            }
            Err(err) => error!("Failed to create visibility observer: {:?}", err),
        }
    }
}

type SharedController<S> = Rc<RefCell<Controller<BrowserPage, S>>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Listen {
    Default,
    Passive,
}

fn listen<S, F>(
    target: &EventTarget,
    kind: &str,
    mode: Listen,
    controller: &SharedController<S>,
    to_page_event: F,
) -> Result<(), JsValue>
where
    S: Scheduler,
    F: Fn(&Event) -> Option<PageEvent> + 'static,
{
    let controller = Rc::clone(controller);
    let callback = Closure::<dyn Fn(Event)>::new(move |event: Event| {
        let Some(page_event) = to_page_event(&event) else {
            return;
        };
        match controller.try_borrow_mut() {
            Ok(mut controller) => controller.dispatch(page_event),
            Err(_) => error!("Dropped re-entrant {:?}", page_event),
        }
    });

    match mode {
        Listen::Default => {
            target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?
        }
        Listen::Passive => {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &options,
            )?
        }
    }
    // Listeners stay attached for the page lifetime.
    callback.forget();
    Ok(())
}

/// Starts the controller and attaches every listener it needs.
pub fn install<S: Scheduler>(controller: Controller<BrowserPage, S>) -> Result<(), JsValue> {
    let page = controller.page().clone();
    let tracks_pointer = controller.tracks_pointer();
    let contact_form = controller.contact_form().cloned();
    let controller = Rc::new(RefCell::new(controller));
    controller.borrow_mut().start();

    if let Some(button) = page.by_id(MENU_BUTTON_ID) {
        listen(&button, "click", Listen::Default, &controller, |_| {
            Some(PageEvent::MenuButtonClick)
        })?;
    }

    for link in page.query_all(MENU_LINK_SELECTOR) {
        listen(&link, "click", Listen::Default, &controller, |_| {
            Some(PageEvent::MenuLinkClick)
        })?;
    }

    listen(&page.document, "keydown", Listen::Default, &controller, |event| {
        event
            .dyn_ref::<KeyboardEvent>()
            .map(|event| PageEvent::KeyDown(event.key()))
    })?;

    for anchor in page.query_all(ANCHOR_SELECTOR) {
        let link = anchor.clone();
        listen(&anchor, "click", Listen::Default, &controller, move |event| {
            event.prevent_default();
            link.get_attribute("href").map(PageEvent::AnchorClick)
        })?;
    }

    listen(&page.window, "scroll", Listen::Passive, &controller, |_| {
        Some(PageEvent::Scroll)
    })?;

    // The module can finish loading after `load` has already fired.
    if page.load_finished() {
        controller.borrow_mut().dispatch(PageEvent::Load);
    } else {
        listen(&page.window, "load", Listen::Default, &controller, |_| {
            Some(PageEvent::Load)
        })?;
    }

    if let Some(form) = contact_form {
        listen(&form, "submit", Listen::Default, &controller, |event| {
            event.prevent_default();
            Some(PageEvent::ContactSubmit)
        })?;
    }

    if tracks_pointer {
        listen(&page.document, "mousemove", Listen::Passive, &controller, |event| {
            event.dyn_ref::<MouseEvent>().map(|event| PageEvent::PointerMove {
                x: f64::from(event.client_x()),
                y: f64::from(event.client_y()),
            })
        })?;
        listen(&page.document, "touchmove", Listen::Passive, &controller, |event| {
            let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
            Some(PageEvent::PointerMove {
                x: f64::from(touch.client_x()),
                y: f64::from(touch.client_y()),
            })
        })?;
    }

    info!("Page listeners attached");
    Ok(())
}
