//! Geodesic helpers for the duplicate finder and area analytics.
//!
//! Distances use the haversine formula on a spherical Earth. The database
//! query evaluates the same formula in SQL; [`BoundingBox`] provides the
//! cheap index-friendly pre-filter in front of it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Radius used by the duplicate finder when the caller gives none.
pub const DEFAULT_DUPLICATE_RADIUS_KM: f64 = 0.5;

/// Radius used by map listings and area analytics when the caller gives none.
pub const DEFAULT_AREA_RADIUS_KM: f64 = 5.0;

/// Largest radius accepted by radius queries.
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Meters per degree of latitude (close enough for a pre-filter).
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

/// Validate latitude in [-90, 90] and longitude in [-180, 180].
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), CoreError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(CoreError::Validation(format!(
            "Latitude must be between -90 and 90 (got {latitude})"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation(format!(
            "Longitude must be between -180 and 180 (got {longitude})"
        )));
    }
    Ok(())
}

/// Resolve an optional radius in kilometers to meters.
///
/// `None` falls back to `default_km`. Non-positive or oversized radii are
/// rejected.
pub fn radius_to_meters(radius_km: Option<f64>, default_km: f64) -> Result<f64, CoreError> {
    let km = radius_km.unwrap_or(default_km);
    if !km.is_finite() || km <= 0.0 || km > MAX_RADIUS_KM {
        return Err(CoreError::Validation(format!(
            "Radius must be greater than 0 and at most {MAX_RADIUS_KM} km (got {km})"
        )));
    }
    Ok(km * 1000.0)
}

/// Axis-aligned latitude/longitude box enclosing a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every point within `radius_m` of `center`.
    ///
    /// Near the poles, or when the circle crosses the antimeridian, the
    /// longitude range widens to the full [-180, 180].
    pub fn around(center: &Coordinate, radius_m: f64) -> Self {
        let d_lat = radius_m / METERS_PER_DEGREE_LAT;
        let min_lat = (center.latitude - d_lat).max(-90.0);
        let max_lat = (center.latitude + d_lat).min(90.0);

        let cos_lat = center.latitude.to_radians().cos();
        let (min_lng, max_lng) = if cos_lat < 1e-6 || min_lat <= -90.0 || max_lat >= 90.0 {
            (-180.0, 180.0)
        } else {
            let d_lng = d_lat / cos_lat;
            let lo = center.longitude - d_lng;
            let hi = center.longitude + d_lng;
            if lo < -180.0 || hi > 180.0 {
                (-180.0, 180.0)
            } else {
                (lo, hi)
            }
        };

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
}
