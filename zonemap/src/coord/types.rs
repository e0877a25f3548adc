//! Coordinate value types.

use geo::Coord;
use thiserror::Error;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;
/// Lowest zoom level accepted in a view.
pub const MIN_ZOOM: u8 = 0;
/// Highest zoom level accepted in a view.
pub const MAX_ZOOM: u8 = 22;

/// Errors from coordinate validation and view-hash parsing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("invalid zoom level: {0}")]
    InvalidZoom(u8),

    #[error("invalid view hash '{0}', expected #@<lat>,<lon>,<zoom>")]
    InvalidViewHash(String),
}

/// A WGS84 position, always stored as (lat, lon).
///
/// Geometry-library types use `x = lon, y = lat`; convert only through
/// [`LatLon::to_coord`] and [`LatLon::from_coord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that the position is finite and within WGS84 range.
    pub fn validated(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Whether both components are finite and in WGS84 range.
    pub fn is_valid(&self) -> bool {
        Self::validated(self.lat, self.lon).is_ok()
    }

    /// Convert to a geometry coordinate (`x = lon`, `y = lat`).
    #[inline]
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Convert from a geometry coordinate (`x = lon`, `y = lat`).
    #[inline]
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Minimum (southernmost) latitude
    pub min_lat: f64,
    /// Maximum (northernmost) latitude
    pub max_lat: f64,
    /// Minimum (westernmost) longitude
    pub min_lon: f64,
    /// Maximum (easternmost) longitude
    pub max_lon: f64,
}

impl GeoBounds {
    /// Create a new bounding box.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Create a bounding box from a single point.
    pub fn from_point(point: LatLon) -> Self {
        Self::new(point.lat, point.lat, point.lon, point.lon)
    }

    /// Smallest box containing all points, `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = LatLon>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for point in iter {
            bounds.expand(point);
        }
        Some(bounds)
    }

    /// Expand this bounding box to include a point.
    pub fn expand(&mut self, point: LatLon) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Whether the point lies inside (or on the edge of) the box.
    pub fn contains(&self, point: LatLon) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// Get the width of the bounds in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Get the height of the bounds in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl std::fmt::Display for GeoBounds {
    /// Formats as `south,west,north,east`, the Overpass bbox order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
