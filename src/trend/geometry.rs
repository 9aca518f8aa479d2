//! Planar helpers over (bar index, price) points

/// A price sample placed at its bar position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub index: usize,
    pub value: f64,
}

impl Point {
    #[inline]
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }
}

/// Z component of `(a - o) x (b - o)`.
///
/// Positive for a left (counter-clockwise) turn, negative for a right turn,
/// zero when collinear.
#[inline]
pub fn cross(o: Point, a: Point, b: Point) -> f64 {
    let (ox, ax, bx) = (o.index as f64, a.index as f64, b.index as f64);
    (ax - ox) * (b.value - o.value) - (a.value - o.value) * (bx - ox)
}

/// Price per bar of the line through `a` and `b`. `a.index != b.index`.
#[inline]
pub fn slope(a: Point, b: Point) -> f64 {
    (b.value - a.value) / (b.index as f64 - a.index as f64)
}

/// Value at bar `index` on the line through `a` and `b`
#[inline]
pub fn extrapolate(a: Point, b: Point, index: usize) -> f64 {
    a.value + slope(a, b) * (index as f64 - a.index as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_orientation() {
        let o = Point::new(0, 0.0);
        assert!(cross(o, Point::new(1, 0.0), Point::new(2, 1.0)) > 0.0);
        assert!(cross(o, Point::new(1, 0.0), Point::new(2, -1.0)) < 0.0);
        assert_eq!(cross(o, Point::new(1, 1.0), Point::new(2, 2.0)), 0.0);
    }

    #[test]
    fn test_extrapolate() {
        let a = Point::new(2, 10.0);
        let b = Point::new(6, 12.0);
        assert_eq!(slope(a, b), 0.5);
        assert_eq!(extrapolate(a, b, 10), 14.0);
        assert_eq!(extrapolate(a, b, 2), 10.0);
    }
}
