//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator meters, which is the planar space the buffer engine works in.

mod types;

pub use types::{
    CoordError, GeoBounds, LatLon, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use geo::Coord;
use std::f64::consts::PI;

/// WGS84 equatorial radius in meters (spherical Mercator).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Tile edge length in pixels used to derive meters-per-pixel.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Projects a position into Web Mercator meters.
///
/// Returns a coordinate with `x` easting and `y` northing. Latitudes outside
/// [`MIN_LAT`]..=[`MAX_LAT`] are rejected.
#[inline]
pub fn to_mercator(point: LatLon) -> Result<Coord<f64>, CoordError> {
    if !point.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(CoordError::InvalidLatitude(point.lat));
    }
    if !point.lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(CoordError::InvalidLongitude(point.lon));
    }

    let lat_rad = point.lat * PI / 180.0;
    Ok(Coord {
        x: EARTH_RADIUS_M * point.lon * PI / 180.0,
        y: EARTH_RADIUS_M * lat_rad.tan().asinh(),
    })
}

/// Converts Web Mercator meters back to a geographic position.
#[inline]
pub fn from_mercator(coord: Coord<f64>) -> LatLon {
    let lon = coord.x / EARTH_RADIUS_M * 180.0 / PI;
    let lat_rad = (coord.y / EARTH_RADIUS_M).sinh().atan();
    LatLon::new(lat_rad * 180.0 / PI, lon)
}

/// Mercator scale factor at a latitude.
///
/// A ground distance of `d` meters spans `d * mercator_scale(lat)` projected
/// meters at that latitude.
#[inline]
pub fn mercator_scale(lat: f64) -> f64 {
    1.0 / (lat * PI / 180.0).cos()
}

/// Projected meters covered by one screen pixel at a zoom level.
#[inline]
pub fn meters_per_pixel(zoom: u8) -> f64 {
    let world_m = 2.0 * PI * EARTH_RADIUS_M;
    world_m / (TILE_SIZE_PX * 2.0_f64.powi(zoom as i32))
}

/// Bounding box of a screen of `width_px` x `height_px` centred on `center`.
///
/// The box is clamped to the projectable latitude range.
pub fn view_bounds(
    center: LatLon,
    zoom: u8,
    width_px: u32,
    height_px: u32,
) -> Result<GeoBounds, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    let c = to_mercator(center)?;
    let mpp = meters_per_pixel(zoom);
    let half_w = width_px as f64 / 2.0 * mpp;
    let half_h = height_px as f64 / 2.0 * mpp;

    let south_west = from_mercator(Coord {
        x: c.x - half_w,
        y: c.y - half_h,
    });
    let north_east = from_mercator(Coord {
        x: c.x + half_w,
        y: c.y + half_h,
    });

    Ok(GeoBounds::new(
        south_west.lat.max(MIN_LAT),
        north_east.lat.min(MAX_LAT),
        south_west.lon.max(MIN_LON),
        north_east.lon.min(MAX_LON),
    ))
}
