/// Geographic position in WGS84 degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both components are finite (no NaN, no infinities).
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn from_array(a: [f64; 2]) -> Self {
        Self { lon: a[0], lat: a[1] }
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::LngLat;

    #[test]
    fn finite_check() {
        assert!(LngLat::new(100.5, 13.7).is_finite());
        assert!(!LngLat::new(f64::NAN, 0.0).is_finite());
        assert!(!LngLat::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn array_round_trip() {
        let p = LngLat::from_array([100.5, 13.7]);
        assert_eq!(p.to_array(), [100.5, 13.7]);
    }
}
