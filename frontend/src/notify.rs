use log::debug;

use crate::config::NotificationConfig;
use crate::dom::{ClassToggle, ElementLookup, FormControls, NodeTree, StyleWriter};
use crate::scheduler::{Scheduler, TaskOwner};

pub const NOTIFICATION_CLASS: &str = "notification";
const NOTIFICATION_SELECTOR: &str = ".notification";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn background(self) -> &'static str {
        match self {
            Severity::Success => "#2D5A3D",
            Severity::Error => "#FF6B6B",
            Severity::Info => "#fe8e24",
        }
    }
}

const BANNER_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "24px"),
    ("left", "24px"),
    ("right", "24px"),
    ("padding", "16px 20px"),
    ("border-radius", "16px"),
    ("color", "#fff"),
    ("font-family", "'Space Grotesk', sans-serif"),
    ("font-weight", "500"),
    ("text-align", "center"),
    ("box-shadow", "0 4px 20px rgba(0, 0, 0, 0.15)"),
    ("z-index", "9999"),
    ("transform", "translateY(100px)"),
    ("opacity", "0"),
    ("transition", "all 0.3s ease"),
];

const SHOWN: &[(&str, &str)] = &[("transform", "translateY(0)"), ("opacity", "1")];
const HIDDEN: &[(&str, &str)] = &[("transform", "translateY(100px)"), ("opacity", "0")];

/// Toast banner at the bottom of the page. At most one is on screen: showing
/// a new one removes the previous banner and its pending animation steps.
#[derive(Clone)]
pub struct Notifier<P, S> {
    page: P,
    scheduler: S,
    config: NotificationConfig,
}

impl<P, S> Notifier<P, S>
where
    P: ElementLookup + NodeTree + FormControls + StyleWriter + ClassToggle + Clone + 'static,
    S: Scheduler,
{
    pub fn new(page: P, scheduler: S, config: NotificationConfig) -> Self {
        Self { page, scheduler, config }
    }

    pub fn show(&self, message: &str, severity: Severity) {
        let page = &self.page;

        if let Some(existing) = page.query(NOTIFICATION_SELECTOR) {
            page.remove(&existing);
        }
        self.scheduler.cancel(TaskOwner::Notification);

        let (Some(banner), Some(label)) = (page.create_element("div"), page.create_element("span"))
        else {
            return;
        };
        page.add_class(&banner, NOTIFICATION_CLASS);
        page.set_text(&label, message);
        page.append_child(&banner, &label);
        page.set_styles(&banner, BANNER_STYLE);
        page.set_style(&banner, "background-color", severity.background());
        page.append_to_body(&banner);
        debug!("Showing {:?} notification: {}", severity, message);

        {
            let page = page.clone();
            let banner = banner.clone();
            self.scheduler
                .after(TaskOwner::Notification, self.config.enter_ms, move || {
                    page.set_styles(&banner, SHOWN);
                });
        }

        let page = page.clone();
        let scheduler = self.scheduler.clone();
        let exit_ms = self.config.exit_ms;
        self.scheduler
            .after(TaskOwner::Notification, self.config.hold_ms, move || {
                page.set_styles(&banner, HIDDEN);
                scheduler.after(TaskOwner::Notification, exit_ms, move || page.remove(&banner));
            });
    }
}
