use log::debug;

use crate::dom::{ElementLookup, Geometry};

/// In-page links whose clicks are intercepted.
pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

/// Where the window should scroll for `href`, or `None` if the fragment does
/// not resolve to an element. The bare `#` is not a valid selector and never
/// resolves.
pub fn scroll_target<P>(page: &P, href: &str, header_offset: f64) -> Option<f64>
where
    P: ElementLookup + Geometry,
{
    let target = page.query(href)?;
    Some(page.offset_top(&target) - header_offset)
}

pub fn scroll_to_anchor<P>(page: &P, href: &str, header_offset: f64) -> bool
where
    P: ElementLookup + Geometry,
{
    match scroll_target(page, href, header_offset) {
        Some(top) => {
            debug!("Scrolling to {} at {}", href, top);
            page.smooth_scroll_to(top);
            true
        }
        None => false,
    }
}
