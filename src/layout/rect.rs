//! Rectangle geometry for recursive bisection.

use serde::Serialize;

use crate::error::{LayoutError, Result};

/// Axis-aligned rectangle stored as centre plus half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, dx, dy }
    }

    /// The square `[0, side]²`.
    pub fn square(side: f64) -> Self {
        let half = side / 2.0;
        Self::new(half, half, half, half)
    }

    pub fn center(&self) -> Point {
        Point { x: self.x, y: self.y }
    }

    /// L1 distance between the two centres.
    pub fn manhattan(&self, other: &Rect) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Top-left corner and full size.
    pub fn to_group(&self) -> GroupRect {
        GroupRect {
            x: self.x - self.dx,
            y: self.y - self.dy,
            width: 2.0 * self.dx,
            height: 2.0 * self.dy,
        }
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Group outline as handed to the drawing layer: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GroupRect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Split `rect` along its longer half extent into `(high, low)` children.
///
/// The high child takes `ratio` of the split axis and the low child the rest;
/// the two tile the parent exactly when `margin` is 0. Each child's half
/// extents are then scaled by `1 - margin` around its own centre. When the
/// half extents are equal the y axis is split.
pub fn split_position(rect: Rect, ratio: f64, margin: f64) -> Result<(Rect, Rect)> {
    if !(0.0..=1.0).contains(&ratio) || !(0.0..0.5).contains(&margin) {
        return Err(LayoutError::InvalidSplit { ratio, margin });
    }
    let shrink = 1.0 - margin;
    let Rect { x, y, dx, dy } = rect;

    let (high, low) = if dx > dy {
        let high_dx = dx * ratio;
        let low_dx = dx - high_dx;
        (
            Rect::new(x + dx - high_dx, y, high_dx, dy),
            Rect::new(x - dx + low_dx, y, low_dx, dy),
        )
    } else {
        let high_dy = dy * ratio;
        let low_dy = dy - high_dy;
        (
            Rect::new(x, y + dy - high_dy, dx, high_dy),
            Rect::new(x, y - dy + low_dy, dx, low_dy),
        )
    };

    Ok((
        Rect::new(high.x, high.y, high.dx * shrink, high.dy * shrink),
        Rect::new(low.x, low.y, low.dx * shrink, low.dy * shrink),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_even_split_matches_halving() {
        let (high, low) = split_position(Rect::new(50.0, 50.0, 50.0, 20.0), 0.5, 0.0).unwrap();
        assert_eq!(high, Rect::new(75.0, 50.0, 25.0, 20.0));
        assert_eq!(low, Rect::new(25.0, 50.0, 25.0, 20.0));
    }

    #[test]
    fn test_ratio_split_tiles_parent() {
        let parent = Rect::new(10.0, 40.0, 10.0, 40.0);
        let (high, low) = split_position(parent, 0.25, 0.0).unwrap();

        // y is the longer axis
        assert!((high.dy + low.dy - parent.dy).abs() < EPS);
        assert!((high.dy - 10.0).abs() < EPS);
        // high child ends at the parent's top edge, low child starts at its bottom
        assert!((high.y + high.dy - (parent.y + parent.dy)).abs() < EPS);
        assert!((low.y - low.dy - (parent.y - parent.dy)).abs() < EPS);
        // and they meet in the middle
        assert!((high.y - high.dy - (low.y + low.dy)).abs() < EPS);
        assert_eq!(high.dx, parent.dx);
    }

    #[test]
    fn test_margin_shrinks_children() {
        let (high, low) = split_position(Rect::square(100.0), 0.5, 0.2).unwrap();
        assert!((high.dy - 20.0).abs() < EPS);
        assert!((high.dx - 40.0).abs() < EPS);
        assert!((low.dy - 20.0).abs() < EPS);
    }

    #[test]
    fn test_invalid_split_rejected() {
        assert!(split_position(Rect::square(1.0), 1.5, 0.0).is_err());
        assert!(split_position(Rect::square(1.0), 0.5, 0.5).is_err());
    }

    #[test]
    fn test_group_rect_conversion() {
        let group = Rect::new(10.0, 20.0, 5.0, 2.0).to_group();
        assert_eq!(group, GroupRect { x: 5.0, y: 18.0, width: 10.0, height: 4.0 });
        assert!(group.contains(Point { x: 10.0, y: 20.0 }));
        assert!(!group.contains(Point { x: 16.0, y: 20.0 }));
    }
}
