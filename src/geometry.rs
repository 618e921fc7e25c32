//! Cell coordinates used by grid placement: [`Offset`] and [`Size`].

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A cell position, or a displacement between two cell positions.
///
/// Arithmetic saturates at the `i32` bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The reference point every grid starts from.
    pub const ORIGIN: Offset = Offset { x: 0, y: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset {
            x: self.x.saturating_neg(),
            y: self.y.saturating_neg(),
        }
    }
}

impl From<(i32, i32)> for Offset {
    fn from((x, y): (i32, i32)) -> Self {
        Offset { x, y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A span of grid cells (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// A single cell.
    pub const ONE: Size = Size { width: 1, height: 1 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Total number of cells covered.
    #[inline]
    pub const fn area(self) -> i32 {
        self.width.saturating_mul(self.height)
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Size { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_arithmetic() {
        let a = Offset::new(3, 4);
        let b = Offset::new(1, -2);
        assert_eq!(a + b, Offset::new(4, 2));
        assert_eq!(a - b, Offset::new(2, 6));
        assert_eq!(-a, Offset::new(-3, -4));
    }

    #[test]
    fn offset_arithmetic_saturates() {
        let far = Offset::new(i32::MAX, i32::MIN);
        assert_eq!(far + Offset::new(1, -1), far);
        assert_eq!(far - Offset::new(-1, 1), far);
        assert_eq!(-Offset::new(i32::MIN, 0), Offset::new(i32::MAX, 0));
        assert_eq!(Size::new(i32::MAX, 2).area(), i32::MAX);
    }

    #[test]
    fn origin_is_zero() {
        assert_eq!(Offset::ORIGIN, Offset::default());
    }

    #[test]
    fn size_area() {
        assert_eq!(Size::new(2, 3).area(), 6);
        assert_eq!(Size::ZERO.area(), 0);
        assert_eq!(Size::ONE.area(), 1);
    }

    #[test]
    fn tuple_conversions() {
        assert_eq!(Offset::from((1, 2)), Offset::new(1, 2));
        assert_eq!(Size::from((2, 1)), Size::new(2, 1));
    }
}
