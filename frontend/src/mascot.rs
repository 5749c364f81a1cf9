use crate::config::MascotConfig;
use crate::dom::{ElementLookup, Geometry, Rect, StyleWriter};

pub const MASCOT_BODY_SELECTOR: &str = ".mascot-body";
pub const MASCOT_EYE_SELECTOR: &str = ".mascot-eye";

/// Eye translation for a pointer at `(x, y)`: distance from the body's
/// center scaled down by `divisor`, clamped per axis to `max_offset`.
pub fn eye_offset(pointer: (f64, f64), body: Rect, config: MascotConfig) -> (f64, f64) {
    let (center_x, center_y) = body.center();
    let axis = |delta: f64| (delta / config.divisor).clamp(-config.max_offset, config.max_offset);
    (axis(pointer.0 - center_x), axis(pointer.1 - center_y))
}

/// Points every eye at the pointer. No-op when the page has no mascot.
pub fn follow_pointer<P>(page: &P, x: f64, y: f64, config: MascotConfig)
where
    P: ElementLookup + Geometry + StyleWriter,
{
    let Some(body) = page.query(MASCOT_BODY_SELECTOR) else {
        return;
    };
    let (dx, dy) = eye_offset((x, y), page.bounding_rect(&body), config);
    let transform = format!("translate({}px, {}px)", dx, dy);
    for eye in page.query_all_within(&body, MASCOT_EYE_SELECTOR) {
        page.set_style(&eye, "transform", &transform);
    }
}
