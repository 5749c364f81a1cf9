//! Visibility-driven cascades for the feature sections and pricing cards,
//! plus the start-up stagger of the floating icon loop animation.
//!
//! Feature sections animate every time they come back into view. Pricing
//! cards animate once, the first time the first card shows up, and the
//! observer is dropped afterwards.

use log::debug;

use crate::config::StaggerConfig;
use crate::dom::{css_seconds, stagger_ms, Crossing, ElementLookup, Observation, Page, StyleWriter};
use crate::scheduler::{Scheduler, TaskOwner};

pub const FEATURE_SECTION_SELECTOR: &str = ".feature-section";
pub const FLOATING_ICON_SELECTOR: &str = ".floating-icon";
pub const PRICING_CARD_SELECTOR: &str = ".pricing-card";

const EASE_IN: &str = "opacity 0.5s ease, transform 0.5s ease";

/// Start and end states of one cascade.
struct Cascade {
    hidden_transform: &'static str,
    shown_transform: &'static str,
}

const ICON_CASCADE: Cascade = Cascade {
    hidden_transform: "translateY(20px) scale(0.8)",
    shown_transform: "translateY(0) scale(1)",
};

const CARD_CASCADE: Cascade = Cascade {
    hidden_transform: "translateY(30px)",
    shown_transform: "translateY(0)",
};

fn cascade<P, S>(
    page: &P,
    scheduler: &S,
    owner: TaskOwner,
    nodes: Vec<P::Node>,
    config: StaggerConfig,
    cascade: &Cascade,
) where
    P: StyleWriter + Clone + 'static,
    S: Scheduler,
{
    let shown = cascade.shown_transform;
    for (index, node) in nodes.into_iter().enumerate() {
        page.set_styles(&node, &[("opacity", "0"), ("transform", cascade.hidden_transform)]);
        let page = page.clone();
        let delay = stagger_ms(config.base_ms, config.step_ms, index);
        scheduler.after(owner, delay, move || {
            page.set_styles(
                &node,
                &[("transition", EASE_IN), ("opacity", "1"), ("transform", shown)],
            );
        });
    }
}

/// Offsets the looping float animation of each icon so they drift out of
/// phase.
pub fn stagger_floating_icons<P>(page: &P, step_secs: f64)
where
    P: ElementLookup + StyleWriter,
{
    for (index, icon) in page.query_all(FLOATING_ICON_SELECTOR).iter().enumerate() {
        page.set_style(icon, "animation-delay", &css_seconds(index as f64 * step_secs));
    }
}

/// Returns the number of sections being watched.
pub fn observe_feature_sections<P, S>(page: &P, scheduler: &S, config: StaggerConfig) -> usize
where
    P: Page,
    S: Scheduler,
{
    let sections = page.query_all(FEATURE_SECTION_SELECTOR);
    if sections.is_empty() {
        return 0;
    }

    let observed = sections.len();
    let callback_page = page.clone();
    let scheduler = scheduler.clone();
    page.observe(
        &sections,
        config.threshold,
        Box::new(move |crossings: &[Crossing<P::Node>]| {
            for crossing in crossings.iter().filter(|c| c.intersecting) {
                let icons = callback_page.query_all_within(&crossing.target, FLOATING_ICON_SELECTOR);
                debug!("Feature section in view, animating {} icon(s)", icons.len());
                cascade(
                    &callback_page,
                    &scheduler,
                    TaskOwner::FeatureSection,
                    icons,
                    config,
                    &ICON_CASCADE,
                );
            }
            Observation::Continue
        }),
    );
    observed
}

/// Watches the first pricing card; returns whether there was one.
pub fn observe_pricing_cards<P, S>(page: &P, scheduler: &S, config: StaggerConfig) -> bool
where
    P: Page,
    S: Scheduler,
{
    let Some(first) = page.query(PRICING_CARD_SELECTOR) else {
        return false;
    };

    let callback_page = page.clone();
    let scheduler = scheduler.clone();
    page.observe(
        &[first],
        config.threshold,
        Box::new(move |crossings: &[Crossing<P::Node>]| {
            if !crossings.iter().any(|c| c.intersecting) {
                return Observation::Continue;
            }
            let cards = callback_page.query_all(PRICING_CARD_SELECTOR);
            debug!("Pricing in view, animating {} card(s)", cards.len());
            cascade(
                &callback_page,
                &scheduler,
                TaskOwner::PricingCards,
                cards,
                config,
                &CARD_CASCADE,
            );
            Observation::Disconnect
        }),
    );
    true
}
