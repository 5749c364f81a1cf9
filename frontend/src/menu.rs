use log::debug;

use crate::dom::{ClassToggle, ElementLookup, FormControls};

pub const MENU_BUTTON_ID: &str = "menuBtn";
pub const MOBILE_MENU_ID: &str = "mobileMenu";
pub const NAV_CONTAINER_SELECTOR: &str = ".nav-container";
pub const MENU_LINK_SELECTOR: &str = ".menu-links a";

const OVERLAY_ACTIVE_CLASS: &str = "active";
const NAV_OPEN_CLASS: &str = "menu-open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    ButtonClick,
    LinkClick,
    Escape,
}

impl MenuEvent {
    /// Only Escape is bound, and only while the menu is open.
    pub fn from_key(key: &str, state: MenuState) -> Option<Self> {
        (key == "Escape" && state.is_open()).then_some(Self::Escape)
    }
}

/// Whether the mobile navigation overlay is showing. Starts closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn on(self, event: MenuEvent) -> Self {
        let open = match event {
            MenuEvent::ButtonClick => !self.open,
            MenuEvent::LinkClick | MenuEvent::Escape => false,
        };
        Self { open }
    }

    pub fn button_label(self) -> &'static str {
        if self.open {
            "Close"
        } else {
            "Menu"
        }
    }
}

/// The three elements the menu writes to. Any of them may be missing.
#[derive(Debug, Clone)]
pub struct MenuElements<N> {
    pub button: Option<N>,
    pub overlay: Option<N>,
    pub nav: Option<N>,
}

impl<N: Clone> MenuElements<N> {
    pub fn resolve<P: ElementLookup<Node = N>>(page: &P) -> Self {
        Self {
            button: page.by_id(MENU_BUTTON_ID),
            overlay: page.by_id(MOBILE_MENU_ID),
            nav: page.query(NAV_CONTAINER_SELECTOR),
        }
    }

    pub fn render<P>(&self, page: &P, state: MenuState)
    where
        P: ClassToggle<Node = N> + FormControls<Node = N>,
    {
        if let Some(overlay) = &self.overlay {
            page.set_class(overlay, OVERLAY_ACTIVE_CLASS, state.is_open());
        }
        if let Some(nav) = &self.nav {
            page.set_class(nav, NAV_OPEN_CLASS, state.is_open());
        }
        if let Some(button) = &self.button {
            page.set_text(button, state.button_label());
        }
    }
}

/// Menu component: owns its state and the elements it renders into.
#[derive(Debug, Clone)]
pub struct Menu<N> {
    state: MenuState,
    elements: MenuElements<N>,
}

impl<N: Clone> Menu<N> {
    pub fn new(elements: MenuElements<N>) -> Self {
        Self {
            state: MenuState::default(),
            elements,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn handle<P>(&mut self, page: &P, event: MenuEvent)
    where
        P: ClassToggle<Node = N> + FormControls<Node = N>,
    {
        let next = self.state.on(event);
        debug!("Menu {:?}: open {} -> {}", event, self.state.is_open(), next.is_open());
        self.state = next;
        self.elements.render(page, next);
    }
}
