//! Rectangles, sizes, and DPI-scaling math shared by the window enumerator
//! and the capture engine.
//!
//! Everything in this module is pure arithmetic on plain integers — no
//! Win32 calls — so it compiles and is tested on every platform, matching
//! the "the decoder [and its supporting math] is platform-agnostic" split
//! in the system overview.

use serde::{Deserialize, Serialize};

/// A device-pixel rectangle with four independent signed edges.
///
/// Valid for a capture region when `right > left` and `bottom > top`;
/// callers building one from partial input (e.g. a capture region
/// override) must check [`Rect::is_valid`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// `right > left && bottom > top`.
    pub fn is_valid(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Scale each edge independently by `dpi / 96.0` and round each edge
    /// up (ceiling). This does *not* guarantee `width()` of the result
    /// equals `ceil(raw_width * scale)` — per-edge rounding can differ
    /// from that by one pixel. That is the source behavior and is
    /// preserved deliberately; see DESIGN.md's Open Question note.
    pub fn scaled_by_dpi(&self, dpi: u32) -> Rect {
        let scale = dpi as f64 / 96.0;
        Rect {
            left: scale_edge(self.left, scale),
            top: scale_edge(self.top, scale),
            right: scale_edge(self.right, scale),
            bottom: scale_edge(self.bottom, scale),
        }
    }
}

fn scale_edge(edge: i32, scale: f64) -> i32 {
    (edge as f64 * scale).ceil() as i32
}

/// A strictly positive width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub cx: u32,
    pub cy: u32,
}

impl Size {
    /// Build a `Size` from a (possibly invalid) rect, failing the same
    /// way the capture engine does: non-positive width/height is an
    /// error, not a clamp.
    pub fn from_rect(rect: &Rect) -> Option<Size> {
        let (w, h) = (rect.width(), rect.height());
        if w > 0 && h > 0 {
            Some(Size { cx: w as u32, cy: h as u32 })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_region_rejected() {
        let r = Rect::new(-10, 0, -10, 5);
        assert!(!r.is_valid());
        assert!(Size::from_rect(&r).is_none());
    }

    #[test]
    fn valid_region_accepted() {
        let r = Rect::new(0, 0, 1920, 1080);
        assert!(r.is_valid());
        assert_eq!(Size::from_rect(&r), Some(Size { cx: 1920, cy: 1080 }));
    }

    /// DPI scaling invariant from the testable-properties list: each
    /// edge equals `ceil(raw_edge * dpi / 96)` independently.
    #[test]
    fn dpi_scaling_ceils_each_edge_independently() {
        let raw = Rect::new(100, 50, 917, 733);
        let scaled = raw.scaled_by_dpi(144); // scale = 1.5
        assert_eq!(scaled.left, (100f64 * 1.5).ceil() as i32);
        assert_eq!(scaled.top, (50f64 * 1.5).ceil() as i32);
        assert_eq!(scaled.right, (917f64 * 1.5).ceil() as i32);
        assert_eq!(scaled.bottom, (733f64 * 1.5).ceil() as i32);
    }

    #[test]
    fn dpi_96_is_identity_for_exact_multiples() {
        let raw = Rect::new(0, 0, 800, 600);
        let scaled = raw.scaled_by_dpi(96);
        assert_eq!(scaled, raw);
    }

    #[test]
    fn rect_serializes_to_json() {
        let r = Rect::new(0, 0, 1920, 1080);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("1920"));
        assert!(json.contains("1080"));
    }
}
