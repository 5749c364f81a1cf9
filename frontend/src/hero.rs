use log::debug;

use crate::config::HeroConfig;
use crate::dom::{stagger_ms, ElementLookup, StyleWriter};
use crate::scheduler::{Scheduler, TaskOwner};

pub const HERO_LETTER_SELECTOR: &str = ".hero-letter";
pub const HERO_TAGLINE_SELECTOR: &str = ".hero-tagline";

/// Letter-by-letter entrance of the hero heading, then the tagline fade.
/// Meant to run once, after the window `load` event.
pub fn play<P, S>(page: &P, scheduler: &S, config: HeroConfig)
where
    P: ElementLookup + StyleWriter + Clone + 'static,
    S: Scheduler,
{
    let letters = page.query_all(HERO_LETTER_SELECTOR);
    debug!("Animating {} hero letter(s)", letters.len());

    for (index, letter) in letters.into_iter().enumerate() {
        page.set_styles(&letter, &[("opacity", "0"), ("transform", "translateY(30px)")]);

        let page = page.clone();
        let delay = stagger_ms(config.letter_base_ms, config.letter_step_ms, index);
        scheduler.after(TaskOwner::Hero, delay, move || {
            page.set_styles(
                &letter,
                &[
                    ("transition", "opacity 0.5s ease, transform 0.5s ease"),
                    ("opacity", "1"),
                    ("transform", "translateY(0)"),
                ],
            );
        });
    }

    if let Some(tagline) = page.query(HERO_TAGLINE_SELECTOR) {
        page.set_style(&tagline, "opacity", "0");
        let page = page.clone();
        scheduler.after(TaskOwner::Hero, config.tagline_delay_ms, move || {
            page.set_styles(&tagline, &[("transition", "opacity 0.6s ease"), ("opacity", "1")]);
        });
    }
}
