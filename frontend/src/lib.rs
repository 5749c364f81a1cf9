//! Interaction layer for the Dusk Media marketing site: mobile menu, smooth
//! anchor scrolling, scroll and visibility reveals, the hero entrance, the
//! contact form and its toast notifications, and the mascot's eyes.

pub mod anchors;
pub mod browser;
pub mod config;
pub mod contact;
pub mod controller;
pub mod dom;
pub mod hero;
pub mod mascot;
pub mod menu;
pub mod notify;
pub mod reveal;
pub mod scheduler;
pub mod sections;

#[cfg(test)]
pub(crate) mod testing;

use log::error;

use crate::browser::BrowserPage;
use crate::config::InteractionConfig;
use crate::controller::Controller;
use crate::scheduler::TimerScheduler;

/// Wires the page interactions into the current document.
pub fn start() {
    let Some(page) = BrowserPage::new() else {
        error!("No window/document available, page interactions disabled");
        return;
    };
    let config = InteractionConfig::load(&page);
    let controller = Controller::new(page, TimerScheduler::default(), config);
    if let Err(err) = browser::install(controller) {
        error!("Failed to attach page interactions: {:?}", err);
    }
}
