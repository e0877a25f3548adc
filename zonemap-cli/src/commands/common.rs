//! Helpers shared across CLI commands.

use zonemap::config::ConfigFile;
use zonemap::layers::CategoryLayers;
use zonemap::session::Viewport;
use zonemap::{Category, ExclusionZone};

use crate::error::CliError;

/// Square metres per hectare.
const M2_PER_HECTARE: f64 = 10_000.0;

/// Parse a view hash into a viewport sized from the configuration.
pub fn resolve_viewport(hash: &str, config: &ConfigFile) -> Result<Viewport, CliError> {
    Ok(Viewport::from_hash(
        hash,
        config.session.viewport_width,
        config.session.viewport_height,
    )?)
}

/// One-line description of a published zone.
pub fn zone_summary(zone: &ExclusionZone) -> String {
    let categories: Vec<&str> = zone.categories.iter().map(|c| c.name()).collect();
    format!(
        "zone #{}: {} polygon(s), {:.2} ha [{}]",
        zone.generation,
        zone.polygons.0.len(),
        zone.area_m2() / M2_PER_HECTARE,
        categories.join(", ")
    )
}

/// Per-category marker counts with visibility, one line each.
pub fn layer_summary(layers: &CategoryLayers) -> Vec<String> {
    layers
        .layers()
        .map(|layer| {
            format!(
                "  {:<11} {:>5}  {:<6}  {}",
                layer.category().name(),
                layer.len(),
                if layer.is_visible() { "shown" } else { "hidden" },
                layer.category().label()
            )
        })
        .collect()
}

/// Parse a category name for clap.
pub fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonemap::coord::LatLon;

    #[test]
    fn test_resolve_viewport_uses_configured_size() {
        let mut config = ConfigFile::default();
        config.session.viewport_width = 400;
        config.session.viewport_height = 400;
        let small = resolve_viewport("#@53.07,8.80,14", &config).unwrap();
        let large = resolve_viewport("#@53.07,8.80,14", &ConfigFile::default()).unwrap();

        assert_eq!(small.center, LatLon::new(53.07, 8.80));
        assert!(small.bounds.width() < large.bounds.width());
    }

    #[test]
    fn test_resolve_viewport_rejects_garbage() {
        assert!(matches!(
            resolve_viewport("bremen", &ConfigFile::default()),
            Err(CliError::View(_))
        ));
    }

    #[test]
    fn test_zone_summary() {
        let zone = ExclusionZone {
            categories: vec![Category::School, Category::Sport],
            ..ExclusionZone::empty()
        };
        assert_eq!(
            zone_summary(&zone),
            "zone #0: 0 polygon(s), 0.00 ha [school, sport]"
        );
    }

    #[test]
    fn test_layer_summary_lists_all_categories() {
        let mut layers = CategoryLayers::new();
        layers.set_visible(Category::Other, false);
        let lines = layer_summary(&layers);
        assert_eq!(lines.len(), 5);
        assert!(lines[4].contains("hidden"));
    }
}
