//! Geographic coordinates and circular areas.
//!
//! Distances are great-circle distances on a spherical earth, computed with the
//! haversine formula. This is precise enough for the few kilometers a room filter
//! usually covers.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the earth, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
        }
    }

    /// Returns the great-circle distance to `other` in meters.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let cairo = Location::new(30.04896, 31.22366);
    /// let nearby = Location::new(30.05113, 31.21918);
    /// assert!(cairo.distance_to(&nearby) < 500.0);
    /// ```
    pub fn distance_to(&self, other: &Location) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Returns the initial bearing towards `other` in degrees, in `(-180, 180]`.
    ///
    /// 0° is north, 90° is east.
    pub fn bearing_to(&self, other: &Location) -> f64 {
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

        y.atan2(x).to_degrees()
    }

    /// Returns a Google Maps link pointing at this location.
    pub fn to_maps_link(&self) -> String {
        format!(
            "https://maps.google.de/maps?q={:.6},{:.6}",
            self.latitude, self.longitude
        )
    }

    /// Whether both coordinates are finite and within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A circular area: a center and a radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationRadius {
    #[serde(flatten)]
    pub location: Location,
    pub radius_m: f64,
}

impl LocationRadius {
    pub fn new(latitude: f64, longitude: f64, radius_m: f64) -> Self {
        LocationRadius {
            location: Location::new(latitude, longitude),
            radius_m,
        }
    }

    /// Whether `point` lies inside the area. A point exactly on the border is inside.
    pub fn contains(&self, point: &Location) -> bool {
        self.location.distance_to(point) <= self.radius_m
    }
}
