//! Great-circle distances between WGS84 coordinates.

use serde::Serialize;

use crate::error::{CampusError, Result};

/// Mean Earth radius used for distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::InvalidCoordinate`] unless `lat` is within ±90°,
    /// `lon` within ±180°, and both are finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(CampusError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Distance between two points in kilometres, by the spherical law of cosines.
///
/// # Example
///
/// ```
/// use campus::geo::{distance_km, Coordinate};
///
/// let london = Coordinate::new(51.5074, -0.1278).unwrap();
/// let paris = Coordinate::new(48.8566, 2.3522).unwrap();
/// let d = distance_km(london, paris);
/// assert!((d - 343.5).abs() < 1.0);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lon = b.lon.to_radians() - a.lon.to_radians();

    // Rounding can push the cosine just past ±1 for (near-)identical points.
    let cos_angle = lat1.cos() * lat2.cos() * delta_lon.cos() + lat1.sin() * lat2.sin();
    EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = Coordinate::new(12.9716, 77.5946).unwrap();
        assert!(distance_km(p, p) < 1e-3);
    }

    #[test]
    fn test_quarter_circumference() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, 90.0).unwrap();
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((distance_km(a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinate::new(28.6139, 77.2090).unwrap();
        let b = Coordinate::new(19.0760, 72.8777).unwrap();
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        // Delhi to Mumbai is roughly 1150 km
        assert!((distance_km(a, b) - 1150.0).abs() < 15.0);
    }
}
