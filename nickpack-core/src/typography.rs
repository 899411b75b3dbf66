//! Font sizing and vertical placement for single-line nickname overlays.
//!
//! Two pure resolvers live here:
//! - [`resolve_font_size`]: (text length, container width, ratio profile)
//!   → pixel font size, via a length-keyed breakpoint table.
//! - [`resolve_text_position`]: (font size, position profile) → vertical
//!   placement, via linear interpolation between two anchor points.
//!
//! Both are deterministic and free of I/O, so they are usable (and tested)
//! independently of any template asset.

/// Font sizing fractions of a reference width.
///
/// `base_font_ratio` must be >= `min_font_ratio`; both are positive.
#[derive(Debug, Clone, Copy)]
pub struct RatioProfile {
    pub base_font_ratio: f64,
    pub min_font_ratio: f64,
}

/// Anchor points for linear vertical placement.
///
/// A font size of `max_font_size` maps to `max_y` and `min_font_size` maps
/// to `min_y`; `max_font_size > min_font_size`.
#[derive(Debug, Clone, Copy)]
pub struct PositionProfile {
    pub max_y: i32,
    pub min_y: i32,
    pub max_font_size: u32,
    pub min_font_size: u32,
}

/// One row of the length-keyed scaling table.
#[derive(Debug, Clone, Copy)]
pub struct Breakpoint {
    pub length: usize,
    pub scale: f64,
}

/// Length-keyed font scaling table, first-match-wins by ascending length.
///
/// Lengths are strictly increasing, scales non-increasing and in (0, 1].
/// The last entry is the fallback for any length beyond the table.
pub const LENGTH_BREAKPOINTS: &[Breakpoint] = &[
    Breakpoint {
        length: 4,
        scale: 0.98,
    },
    Breakpoint {
        length: 6,
        scale: 0.86,
    },
    Breakpoint {
        length: 8,
        scale: 0.74,
    },
    Breakpoint {
        length: 10,
        scale: 0.64,
    },
    Breakpoint {
        length: 13,
        scale: 0.55,
    },
    Breakpoint {
        length: 16,
        scale: 0.47,
    },
    Breakpoint {
        length: 20,
        scale: 0.40,
    },
    Breakpoint {
        length: 25,
        scale: 0.34,
    },
    Breakpoint {
        length: 32,
        scale: 0.28,
    },
];

/// Resolve the pixel font size for an identifier inside a container width.
///
/// `base = round(width * base_font_ratio)` is scaled down by the breakpoint
/// matching the identifier's character count (first breakpoint whose length
/// is >= the count; the last entry catches everything longer), then floored
/// at `round(width * min_font_ratio)`. The empty identifier resolves
/// against the first breakpoint.
pub fn resolve_font_size(identifier: &str, container_width: u32, profile: &RatioProfile) -> u32 {
    let base = (container_width as f64 * profile.base_font_ratio).round();
    let min = (container_width as f64 * profile.min_font_ratio).round();

    let len = identifier.chars().count();
    let scale = LENGTH_BREAKPOINTS
        .iter()
        .find(|bp| bp.length >= len)
        .unwrap_or_else(|| {
            LENGTH_BREAKPOINTS
                .last()
                .expect("breakpoint table is non-empty")
        })
        .scale;

    (base * scale).round().max(min) as u32
}

/// Resolve the vertical placement for a resolved font size.
///
/// Linear through the profile's two anchor points:
/// `position(max_font_size) == max_y` and `position(min_font_size) == min_y`
/// exactly. Font sizes outside the profile range extrapolate linearly, on
/// purpose; the result may land outside `[min_y, max_y]`.
pub fn resolve_text_position(font_size: u32, profile: &PositionProfile) -> i32 {
    let span_y = (profile.max_y - profile.min_y) as f64;
    let span_font = (profile.max_font_size - profile.min_font_size) as f64;
    let shortfall = profile.max_font_size as f64 - font_size as f64;

    (profile.max_y as f64 - span_y * shortfall / span_font).round() as i32
}
