//! Screen-space layout primitives shared by the renderer and hit testing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// A `w`x`h` rect whose center is `(cx, cy)`, clamped at the screen origin.
    pub fn around(cx: u32, cy: u32, w: u32, h: u32) -> Self {
        Self {
            x: cx.saturating_sub(w / 2),
            y: cy.saturating_sub(h / 2),
            w,
            h,
        }
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && px < self.x.saturating_add(self.w)
            && py >= self.y
            && py < self.y.saturating_add(self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_centers_rect_on_point() {
        let r = Rect::around(313, 259, 66, 38);
        assert_eq!(r, Rect::new(280, 240, 66, 38));
    }

    #[test]
    fn around_saturates_at_origin() {
        assert_eq!(Rect::around(5, 5, 20, 20), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn contains_excludes_far_edges() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
    }
}
