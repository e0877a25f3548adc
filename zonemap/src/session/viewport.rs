//! Map viewport and its URL-hash form.

use std::fmt;
use std::str::FromStr;

use crate::coord::{view_bounds, CoordError, GeoBounds, LatLon, MAX_ZOOM};

/// Default screen width in pixels used to derive bounds.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default screen height in pixels used to derive bounds.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// Decimals of latitude/longitude in a formatted view hash.
pub const VIEW_HASH_DECIMALS: usize = 5;

/// Visible map region: centre, zoom and the derived bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLon,
    pub zoom: u8,
    pub bounds: GeoBounds,
}

impl Viewport {
    /// Viewport of a `width_px` x `height_px` screen centred on `center`.
    pub fn from_center(
        center: LatLon,
        zoom: u8,
        width_px: u32,
        height_px: u32,
    ) -> Result<Self, CoordError> {
        let bounds = view_bounds(center, zoom, width_px, height_px)?;
        Ok(Self {
            center,
            zoom,
            bounds,
        })
    }

    /// Parse a view hash and derive bounds for the given screen size.
    pub fn from_hash(hash: &str, width_px: u32, height_px: u32) -> Result<Self, CoordError> {
        let view: ViewHash = hash.parse()?;
        Self::from_center(view.center, view.zoom, width_px, height_px)
    }

    /// `#@<lat>,<lon>,<zoom>` for this viewport.
    pub fn hash(&self) -> String {
        ViewHash {
            center: self.center,
            zoom: self.zoom,
        }
        .to_string()
    }
}

/// Centre and zoom as carried in a URL fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewHash {
    pub center: LatLon,
    pub zoom: u8,
}

impl fmt::Display for ViewHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#@{:.prec$},{:.prec$},{}",
            self.center.lat,
            self.center.lon,
            self.zoom,
            prec = VIEW_HASH_DECIMALS
        )
    }
}

impl FromStr for ViewHash {
    type Err = CoordError;

    /// Accepts `#@lat,lon,zoom` with the leading `#` optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordError::InvalidViewHash(s.to_string());

        let trimmed = s.trim();
        let body = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let body = body.strip_prefix('@').ok_or_else(invalid)?;

        let mut fields = body.split(',').map(str::trim);
        let (Some(lat), Some(lon), Some(zoom), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };

        let lat: f64 = lat.parse().map_err(|_| invalid())?;
        let lon: f64 = lon.parse().map_err(|_| invalid())?;
        let zoom: u8 = zoom.parse().map_err(|_| invalid())?;
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }

        Ok(Self {
            center: LatLon::validated(lat, lon)?,
            zoom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_hash() {
        let a: ViewHash = "#@53.07118,8.80877,14".parse().unwrap();
        let b: ViewHash = "@53.07118,8.80877,14".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.center, LatLon::new(53.07118, 8.80877));
        assert_eq!(a.zoom, 14);
    }

    #[test]
    fn test_format_five_decimals() {
        let view = ViewHash {
            center: LatLon::new(53.0711829, 8.8087718),
            zoom: 14,
        };
        assert_eq!(view.to_string(), "#@53.07118,8.80877,14");
    }

    #[test]
    fn test_malformed_hashes() {
        for bad in [
            "",
            "#53.0,8.8,14",
            "#@53.0,8.8",
            "#@53.0,8.8,14,2",
            "#@abc,8.8,14",
            "#@53.0,8.8,-1",
        ] {
            assert!(
                matches!(bad.parse::<ViewHash>(), Err(CoordError::InvalidViewHash(_))),
                "{:?}",
                bad
            );
        }
        assert_eq!(
            "#@53.0,8.8,30".parse::<ViewHash>(),
            Err(CoordError::InvalidZoom(30))
        );
        assert!(matches!(
            "#@95.0,8.8,14".parse::<ViewHash>(),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_viewport_bounds_contain_center() {
        let viewport = Viewport::from_hash("#@53.07,8.80,14", 1280, 800).unwrap();
        assert!(viewport.bounds.contains(viewport.center));
        assert!(viewport.bounds.width() > viewport.bounds.height());
        assert_eq!(viewport.hash(), "#@53.07000,8.80000,14");
    }

    #[test]
    fn test_higher_zoom_smaller_bounds() {
        let center = LatLon::new(53.07, 8.80);
        let wide = Viewport::from_center(center, 12, 1280, 800).unwrap();
        let close = Viewport::from_center(center, 16, 1280, 800).unwrap();
        assert!(close.bounds.width() < wide.bounds.width());
    }
}
