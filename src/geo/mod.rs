use serde::{Deserialize, Serialize};

/// A position on the flat service grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, distance};

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint::new(10.0, 10.0);
        assert!(distance(&p, &p) < 1e-12);
    }

    #[test]
    fn three_four_five_triangle() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-12);
        assert!((distance(&b, &a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_finite());
    }
}
