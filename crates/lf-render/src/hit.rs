//! Hit testing: point → tile lookup.
//!
//! Reverse-walks the frame's tiles (front-to-back) to find which item is at
//! a given (x, y) canvas position.

use crate::project::RoomFrame;
use kurbo::{Point, Rect};
use lf_core::model::ItemRef;

/// Find the topmost tile at position (px, py).
/// Returns `None` if no tile is hit (background).
pub fn hit_test(frame: &RoomFrame, px: f64, py: f64) -> Option<ItemRef> {
    let point = Point::new(px, py);
    // Last painted = topmost
    frame
        .tiles
        .iter()
        .rev()
        .find(|t| t.rect.contains(point))
        .map(|t| t.item)
}

/// Find all tiles overlapping the given rectangle, in paint order.
/// Used for marquee (box) selection; negative sizes are normalized.
pub fn hit_test_rect(frame: &RoomFrame, rx: f64, ry: f64, rw: f64, rh: f64) -> Vec<ItemRef> {
    let marquee = Rect::from_origin_size((rx, ry), (rw, rh)).abs();
    frame
        .tiles
        .iter()
        .filter(|t| t.rect.intersect(marquee).area() > 0.0)
        .map(|t| t.item)
        .collect()
}
