use serde::{Deserialize, Serialize};

/// Pointer position in container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Widget geometry. `x`/`y` are the top-left corner relative to the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the rectangle lies fully inside a container of `size`.
    pub fn fits_in(&self, size: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= size.width
            && self.y + self.height <= size.height
    }

    /// Move the top-left corner into the container. A widget larger than the
    /// container is pinned to the origin.
    pub fn clamp_position(&mut self, container: Size) {
        self.x = clamp_axis(self.x, container.width - self.width);
        self.y = clamp_axis(self.y, container.height - self.height);
    }
}

/// Minimum widget dimensions enforced while resizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 150.0,
        }
    }
}

impl Constraints {
    pub fn floor(&self, size: Size) -> Size {
        Size::new(size.width.max(self.min_width), size.height.max(self.min_height))
    }
}

/// `value` clamped to `0..=max`; the lower bound wins when `max < 0`.
pub(crate) fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_axis_prefers_origin() {
        assert_eq!(clamp_axis(50.0, 100.0), 50.0);
        assert_eq!(clamp_axis(-10.0, 100.0), 0.0);
        assert_eq!(clamp_axis(150.0, 100.0), 100.0);
        assert_eq!(clamp_axis(30.0, -20.0), 0.0);
    }

    #[test]
    fn oversized_rect_pins_to_origin() {
        let mut r = Rect::new(40.0, 40.0, 900.0, 100.0);
        r.clamp_position(Size::new(800.0, 600.0));
        assert_eq!((r.x, r.y), (0.0, 40.0));
    }
}
