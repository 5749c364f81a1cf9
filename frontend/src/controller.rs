use log::{debug, info};

use crate::anchors;
use crate::config::InteractionConfig;
use crate::contact::ContactForm;
use crate::dom::Page;
use crate::hero;
use crate::mascot::{self, MASCOT_BODY_SELECTOR};
use crate::menu::{Menu, MenuElements, MenuEvent, MenuState};
use crate::notify::Notifier;
use crate::reveal::ScrollReveal;
use crate::scheduler::Scheduler;
use crate::sections;

/// Browser events the controller reacts to, already stripped down to the
/// fields it reads.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    MenuButtonClick,
    MenuLinkClick,
    KeyDown(String),
    /// Click on an in-page link, carrying its raw `href`.
    AnchorClick(String),
    Scroll,
    Load,
    ContactSubmit,
    PointerMove { x: f64, y: f64 },
}

/// The page interaction controller. Built once the document is parsed, fed
/// every event through `dispatch`.
pub struct Controller<P: Page, S: Scheduler> {
    page: P,
    scheduler: S,
    config: InteractionConfig,
    menu: Menu<P::Node>,
    reveal: ScrollReveal<P::Node>,
    contact: Option<ContactForm<P::Node>>,
    notifier: Notifier<P, S>,
    tracks_pointer: bool,
    hero_played: bool,
}

impl<P: Page, S: Scheduler> Controller<P, S> {
    pub fn new(page: P, scheduler: S, config: InteractionConfig) -> Self {
        let menu = Menu::new(MenuElements::resolve(&page));
        let reveal = ScrollReveal::capture(&page, config.reveal);
        let contact = ContactForm::resolve(&page, config.contact);
        let notifier = Notifier::new(page.clone(), scheduler.clone(), config.notification);
        let tracks_pointer = page.query(MASCOT_BODY_SELECTOR).is_some();

        Self {
            page,
            scheduler,
            config,
            menu,
            reveal,
            contact,
            notifier,
            tracks_pointer,
            hero_played: false,
        }
    }

    /// One-time start-up work: floating icon phases, visibility observers and
    /// the eager reveal check.
    pub fn start(&mut self) {
        sections::stagger_floating_icons(&self.page, self.config.floating_icon_stagger_secs);
        let watched =
            sections::observe_feature_sections(&self.page, &self.scheduler, self.config.features);
        let pricing =
            sections::observe_pricing_cards(&self.page, &self.scheduler, self.config.pricing);
        let revealed = self.reveal.check(&self.page);
        info!(
            "Page interactions ready ({} reveal element(s), {} feature section(s), pricing {}, contact form {}, mascot {})",
            self.reveal.len(),
            watched,
            pricing,
            self.contact.is_some(),
            self.tracks_pointer
        );
        debug!("{} element(s) revealed on start", revealed);
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    /// Pointer listeners are only worth attaching when there is a mascot.
    pub fn tracks_pointer(&self) -> bool {
        self.tracks_pointer
    }

    pub fn contact_form(&self) -> Option<&P::Node> {
        self.contact.as_ref().map(ContactForm::element)
    }

    pub fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::MenuButtonClick => self.menu.handle(&self.page, MenuEvent::ButtonClick),
            PageEvent::MenuLinkClick => self.menu.handle(&self.page, MenuEvent::LinkClick),
            PageEvent::KeyDown(key) => {
                if let Some(event) = MenuEvent::from_key(&key, self.menu.state()) {
                    self.menu.handle(&self.page, event);
                }
            }
            PageEvent::AnchorClick(href) => {
                anchors::scroll_to_anchor(&self.page, &href, self.config.header_offset);
            }
            PageEvent::Scroll => {
                self.reveal.check(&self.page);
            }
            PageEvent::Load => {
                if self.hero_played {
                    return;
                }
                self.hero_played = true;
                hero::play(&self.page, &self.scheduler, self.config.hero);
            }
            PageEvent::ContactSubmit => {
                if let Some(contact) = &self.contact {
                    if let Err(err) = contact.submit(&self.page, &self.scheduler, &self.notifier) {
                        debug!("Contact form rejected: {}", err);
                    }
                }
            }
            PageEvent::PointerMove { x, y } => {
                mascot::follow_pointer(&self.page, x, y, self.config.mascot);
            }
        }
    }
}
