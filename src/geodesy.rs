// src/geodesy.rs
//! Earth distance helpers for fix data
//!
//! These use the meridian radius of curvature of an ellipsoidal Earth and
//! are meant for quick distance estimates between fixes, not surveying.

use serde::Serialize;

/// Equatorial radius in meters
pub const EQUATORIAL_RADIUS: f64 = 6_378_137.0;

/// Eccentricity of the ellipsoid
pub const ECCENTRICITY: f64 = 0.081082;

// some multipliers for interpreting GPS output
pub const METERS_TO_FEET: f64 = 3.2808399;
pub const METERS_TO_MILES: f64 = 0.00062137119;
pub const KNOTS_TO_MPH: f64 = 1.1507794;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Position vector in an Earth-centred frame, scaled by the radius of
    /// curvature at this point's own latitude.
    fn to_cartesian(self) -> (f64, f64, f64) {
        let r = radius_of_curvature(self.lat);
        let lon = self.lon.to_radians();
        let colat = (90.0 - self.lat).to_radians();
        (
            r * lon.cos() * colat.sin(),
            r * lon.sin() * colat.sin(),
            r * colat.cos(),
        )
    }
}

/// Radius of curvature in meters of the meridian at the given latitude.
///
/// R' = a * (1 - e^2) / (1 - e^2 * sin^2(lat))^(3/2)
pub fn radius_of_curvature(lat: f64) -> f64 {
    let e2 = ECCENTRICITY * ECCENTRICITY;
    let sc = lat.to_radians().sin();
    EQUATORIAL_RADIUS * (1.0 - e2) / (1.0 - e2 * sc * sc).powf(1.5)
}

/// Distance in meters between two points.
pub fn earth_distance(p1: LatLon, p2: LatLon) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let (x1, y1, z1) = p1.to_cartesian();
    let (x2, y2, z2) = p2.to_cartesian();
    let r = radius_of_curvature((p1.lat + p2.lat) / 2.0);

    let cos_angle = (x1 * x2 + y1 * y2 + z1 * z2) / (r * r);
    if !(-1.0..=1.0).contains(&cos_angle) {
        log::trace!("clamping arccos argument {} for {:?} -> {:?}", cos_angle, p1, p2);
    }

    r * cos_angle.clamp(-1.0, 1.0).acos()
}

/// Offset of `p2` from `p1` as (east, north) meters.
///
/// Built from two distances holding one coordinate fixed, so both parts are
/// unsigned and only sensible over short baselines.
pub fn meter_offset(p1: LatLon, p2: LatLon) -> (f64, f64) {
    (
        earth_distance(p1, LatLon::new(p1.lat, p2.lon)),
        earth_distance(p1, LatLon::new(p2.lat, p1.lon)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_of_curvature() {
        let e2 = ECCENTRICITY * ECCENTRICITY;
        let equator = radius_of_curvature(0.0);
        assert!((equator - EQUATORIAL_RADIUS * (1.0 - e2)).abs() < 1e-6);

        // grows towards the poles
        assert!(radius_of_curvature(45.0) > equator);
        assert!(radius_of_curvature(90.0) > radius_of_curvature(45.0));
        assert!((radius_of_curvature(-30.0) - radius_of_curvature(30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_same_point_is_zero() {
        for p in [
            LatLon::new(0.0, 0.0),
            LatLon::new(37.3, -122.0),
            LatLon::new(-89.9, 179.9),
        ] {
            assert_eq!(earth_distance(p, p), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let a = LatLon::new(48.117, 11.517);
        let b = LatLon::new(52.52, 13.405);
        let ab = earth_distance(a, b);
        let ba = earth_distance(b, a);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 400_000.0 && ab < 600_000.0);
    }

    #[test]
    fn test_one_degree_at_equator() {
        // one degree of arc on the equatorial meridian radius
        let d = earth_distance(LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0));
        let expected = radius_of_curvature(0.0) * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1.0);
        assert!(d > 110_000.0 && d < 111_400.0);
    }

    #[test]
    fn test_antipodes_clamped() {
        let d = earth_distance(LatLon::new(0.0, 0.0), LatLon::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - radius_of_curvature(0.0) * std::f64::consts::PI).abs() < 1.0);
    }

    #[test]
    fn test_meter_offset() {
        let origin = LatLon::new(37.0, -122.0);
        let (east, north) = meter_offset(origin, LatLon::new(37.001, -121.999));
        assert!(east > 50.0 && east < 120.0);
        assert!(north > 100.0 && north < 120.0);

        let (east, north) = meter_offset(origin, origin);
        assert_eq!(east, 0.0);
        assert_eq!(north, 0.0);
    }
}
