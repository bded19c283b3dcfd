/// Great-circle distance on a spherical Earth

use crate::state::data::Coordinates;

/// Mean Earth radius used by the haversine formula, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two points in kilometers (haversine formula)
///
/// NaN inputs yield NaN.
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos() * to.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
