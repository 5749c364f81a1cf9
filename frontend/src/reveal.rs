use log::debug;

use crate::config::RevealConfig;
use crate::dom::{css_seconds, ClassToggle, ElementLookup, Geometry, StyleWriter};

pub const REVEAL_SELECTOR: &str = ".text-reveal";
/// Containers whose `.text-reveal` descendants cascade together.
pub const GROUP_SELECTOR: &str = ".line, .feature-content, .pricing-title, .contact-title";
pub const VISIBLE_CLASS: &str = "visible";

/// Scroll-driven reveal of the `.text-reveal` elements present at start-up.
#[derive(Debug, Clone)]
pub struct ScrollReveal<N> {
    elements: Vec<N>,
    config: RevealConfig,
}

impl<N: Clone + PartialEq> ScrollReveal<N> {
    pub fn capture<P: ElementLookup<Node = N>>(page: &P, config: RevealConfig) -> Self {
        Self {
            elements: page.query_all(REVEAL_SELECTOR),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Reveals every captured element whose top edge has risen above the
    /// reveal line. Runs on every scroll event, so it only reads geometry and
    /// writes classes/styles. Returns how many elements were newly revealed.
    pub fn check<P>(&self, page: &P) -> usize
    where
        P: ElementLookup<Node = N> + ClassToggle<Node = N> + StyleWriter<Node = N> + Geometry<Node = N>,
    {
        let reveal_line = page.viewport_height() * self.config.viewport_ratio;
        let mut revealed = 0;

        for element in &self.elements {
            if page.has_class(element, VISIBLE_CLASS) {
                continue;
            }
            if page.bounding_rect(element).top >= reveal_line {
                continue;
            }
            if let Some(delay) = self.stagger_delay(page, element) {
                page.set_style(element, "transition-delay", &delay);
            }
            page.add_class(element, VISIBLE_CLASS);
            revealed += 1;
        }

        if revealed > 0 {
            debug!("Revealed {} text element(s)", revealed);
        }
        revealed
    }

    fn stagger_delay<P: ElementLookup<Node = N>>(&self, page: &P, element: &N) -> Option<String> {
        let group = page.closest(element, GROUP_SELECTOR)?;
        let index = page
            .query_all_within(&group, REVEAL_SELECTOR)
            .iter()
            .position(|sibling| sibling == element)?;
        Some(css_seconds(index as f64 * self.config.stagger_secs))
    }
}
