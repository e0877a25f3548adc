//! GeoJSON output of displayed markers and the exclusion zone.
//!
//! Circle markers are written as `Point` features with a `radius` property
//! (metres), polygons as `Polygon` features. The zone is one `MultiPolygon`
//! feature with `kind = "exclusion_zone"`.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::coord::LatLon;
use crate::geometry::Shape;
use crate::layers::CategoryLayers;
use crate::marker::ClassifiedMarker;
use crate::session::ExclusionZone;

fn position(point: LatLon) -> Vec<f64> {
    vec![point.lon, point.lat]
}

fn shape_geometry(shape: &Shape) -> Geometry {
    match shape {
        Shape::Circle { center, .. } => Geometry::new(Value::Point(position(*center))),
        Shape::Polygon(vertices) => {
            let mut ring: Vec<Vec<f64>> = vertices.iter().copied().map(position).collect();
            // GeoJSON rings must be closed
            if vertices.first() != vertices.last() {
                if let Some(first) = vertices.first() {
                    ring.push(position(*first));
                }
            }
            Geometry::new(Value::Polygon(vec![ring]))
        }
    }
}

/// One feature per display shape of `marker`.
pub fn marker_features(marker: &ClassifiedMarker) -> Vec<Feature> {
    let category = marker.category();
    let tags: JsonObject = marker
        .entity()
        .tags
        .iter()
        .map(|(k, v)| (k.clone(), JsonValue::from(v.as_str())))
        .collect();

    marker
        .shapes()
        .iter()
        .map(|shape| {
            let mut properties = JsonObject::new();
            properties.insert("id".into(), marker.id().as_str().into());
            properties.insert("category".into(), category.name().into());
            properties.insert("label".into(), category.label().into());
            properties.insert("color".into(), category.color().into());
            if let Shape::Circle { radius_m, .. } = shape {
                properties.insert("radius".into(), JsonValue::from(*radius_m));
            }
            properties.insert("tags".into(), JsonValue::Object(tags.clone()));

            Feature {
                bbox: None,
                geometry: Some(shape_geometry(shape)),
                id: Some(Id::String(marker.id().to_string())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect()
}

/// The zone as a single `MultiPolygon` feature.
pub fn zone_feature(zone: &ExclusionZone) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("kind".into(), "exclusion_zone".into());
    properties.insert("generation".into(), JsonValue::from(zone.generation));
    properties.insert(
        "categories".into(),
        JsonValue::from(
            zone.categories
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>(),
        ),
    );
    properties.insert("area_m2".into(), JsonValue::from(zone.area_m2().round()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&zone.polygons))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Markers of visible categories followed by the zone.
pub fn feature_collection(layers: &CategoryLayers, zone: &ExclusionZone) -> FeatureCollection {
    let mut features: Vec<Feature> = layers
        .layers()
        .filter(|layer| layer.is_visible())
        .flat_map(|layer| layer.markers())
        .flat_map(|marker| marker_features(marker))
        .collect();
    features.push(zone_feature(zone));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::geometry::{BufferEngine, GeometryExtractor};
    use crate::marker::MarkerBuilder;
    use crate::overpass::{tags, RawEntity};
    use geo::{polygon, MultiPolygon};
    use std::sync::Arc;

    fn layers() -> CategoryLayers {
        let builder =
            MarkerBuilder::new(GeometryExtractor::default(), Some(BufferEngine::new(100.0)));
        let mut layers = CategoryLayers::new();
        let school = RawEntity::point(
            1,
            LatLon::new(53.07, 8.80),
            tags([("amenity", "school"), ("name", "Grundschule")]),
        );
        let pitch = RawEntity::way(
            2,
            vec![
                LatLon::new(53.0700, 8.8020),
                LatLon::new(53.0700, 8.8030),
                LatLon::new(53.0710, 8.8030),
                LatLon::new(53.0710, 8.8020),
            ],
            tags([("sport", "soccer")]),
        );
        for entity in [school, pitch] {
            layers.add_marker(Arc::new(builder.build(entity).unwrap()));
        }
        layers
    }

    fn zone() -> ExclusionZone {
        ExclusionZone {
            generation: 3,
            polygons: MultiPolygon::new(vec![polygon![
                (x: 8.79, y: 53.06),
                (x: 8.81, y: 53.06),
                (x: 8.81, y: 53.08),
            ]]),
            categories: vec![Category::School],
        }
    }

    #[test]
    fn test_circle_marker_properties() {
        let layers = layers();
        let marker = layers.layer(Category::School).markers().next().unwrap();
        let features = marker_features(marker);
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(
            feature.geometry.as_ref().unwrap().value,
            Value::Point(vec![8.80, 53.07])
        );
        assert_eq!(feature.property("category"), Some(&JsonValue::from("school")));
        assert_eq!(feature.property("color"), Some(&JsonValue::from("red")));
        assert_eq!(feature.property("radius"), Some(&JsonValue::from(10.0)));
        assert_eq!(
            feature.property("tags").and_then(|t| t.get("name")),
            Some(&JsonValue::from("Grundschule"))
        );
    }

    #[test]
    fn test_polygon_ring_closed() {
        let layers = layers();
        let marker = layers.layer(Category::Sport).markers().next().unwrap();
        let features = marker_features(marker);

        match &features[0].geometry.as_ref().unwrap().value {
            Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("expected polygon, got {:?}", other),
        }
        assert!(features[0].property("radius").is_none());
    }

    #[test]
    fn test_collection_skips_hidden_layers() {
        let mut layers = layers();
        assert_eq!(feature_collection(&layers, &zone()).features.len(), 3);

        layers.set_visible(Category::Sport, false);
        let collection = feature_collection(&layers, &zone());
        assert_eq!(collection.features.len(), 2);

        let zone_feature = collection.features.last().unwrap();
        assert!(matches!(
            zone_feature.geometry.as_ref().unwrap().value,
            Value::MultiPolygon(_)
        ));
        assert_eq!(
            zone_feature.property("kind"),
            Some(&JsonValue::from("exclusion_zone"))
        );
    }

    #[test]
    fn test_output_parses_as_geojson() {
        let text = feature_collection(&layers(), &zone()).to_string();
        let parsed: geojson::GeoJson = text.parse().unwrap();
        assert!(matches!(parsed, geojson::GeoJson::FeatureCollection(_)));
    }
}
