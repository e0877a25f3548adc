//! Per-category marker layers with visibility.
//!
//! Every marker lives in exactly the layer of its category. Hidden layers
//! keep their markers loaded; they only stop contributing buffers to the
//! exclusion zone.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use geo::Polygon;

use crate::classify::Category;
use crate::marker::ClassifiedMarker;
use crate::overpass::EntityId;

/// Markers of one category keyed by id, plus a visibility flag.
#[derive(Debug, Clone)]
pub struct CategoryLayer {
    category: Category,
    visible: bool,
    markers: BTreeMap<EntityId, Arc<ClassifiedMarker>>,
}

impl CategoryLayer {
    fn new(category: Category) -> Self {
        Self {
            category,
            visible: true,
            markers: BTreeMap::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers in id order.
    pub fn markers(&self) -> impl Iterator<Item = &Arc<ClassifiedMarker>> {
        self.markers.values()
    }
}

/// All five category layers. All start visible.
#[derive(Debug, Clone)]
pub struct CategoryLayers {
    layers: [CategoryLayer; 5],
    index: HashMap<EntityId, Category>,
}

impl Default for CategoryLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryLayers {
    pub fn new() -> Self {
        Self {
            layers: Category::ALL.map(CategoryLayer::new),
            index: HashMap::new(),
        }
    }

    /// The layer of `category`.
    pub fn layer(&self, category: Category) -> &CategoryLayer {
        &self.layers[category.index()]
    }

    /// Layers in category order.
    pub fn layers(&self) -> impl Iterator<Item = &CategoryLayer> {
        self.layers.iter()
    }

    /// Show or hide a category. Returns whether visibility changed.
    pub fn set_visible(&mut self, category: Category, visible: bool) -> bool {
        let layer = &mut self.layers[category.index()];
        let changed = layer.visible != visible;
        layer.visible = visible;
        changed
    }

    pub fn is_visible(&self, category: Category) -> bool {
        self.layer(category).visible
    }

    /// Categories currently shown, in category order.
    pub fn visible_categories(&self) -> Vec<Category> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .map(|l| l.category)
            .collect()
    }

    /// Insert a marker into its category's layer.
    ///
    /// A marker already present under the same id is replaced, moving layers
    /// if its category differs.
    pub fn add_marker(&mut self, marker: Arc<ClassifiedMarker>) {
        let id = marker.id().clone();
        let category = marker.category();
        if let Some(previous) = self.index.insert(id.clone(), category) {
            if previous != category {
                self.layers[previous.index()].markers.remove(&id);
            }
        }
        self.layers[category.index()].markers.insert(id, marker);
    }

    /// Remove a marker by id, returning it if present.
    pub fn remove_marker(&mut self, id: &EntityId) -> Option<Arc<ClassifiedMarker>> {
        let category = self.index.remove(id)?;
        self.layers[category.index()].markers.remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&Arc<ClassifiedMarker>> {
        let category = self.index.get(id)?;
        self.layers[category.index()].markers.get(id)
    }

    /// Buffers of markers in visible categories.
    ///
    /// Order is stable: category order, then id order, then member order.
    pub fn visible_buffers(&self) -> Vec<Polygon<f64>> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.markers.values())
            .flat_map(|m| m.buffers().iter().cloned())
            .collect()
    }

    /// Every loaded marker by id, regardless of visibility.
    pub fn snapshot(&self) -> HashMap<EntityId, Arc<ClassifiedMarker>> {
        self.layers
            .iter()
            .flat_map(|l| l.markers.iter())
            .map(|(id, m)| (id.clone(), Arc::clone(m)))
            .collect()
    }

    /// Marker count per category, in category order.
    pub fn counts(&self) -> [(Category, usize); 5] {
        Category::ALL.map(|c| (c, self.layer(c).len()))
    }

    /// Total number of loaded markers.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::geometry::{BufferEngine, GeometryExtractor};
    use crate::marker::MarkerBuilder;
    use crate::overpass::{tags, RawEntity};

    fn marker(id: u64, lat: f64, key: &str, value: &str) -> Arc<ClassifiedMarker> {
        let builder =
            MarkerBuilder::new(GeometryExtractor::default(), Some(BufferEngine::new(100.0)));
        let entity = RawEntity::point(id, LatLon::new(lat, 8.80), tags([(key, value)]));
        Arc::new(builder.build(entity).unwrap())
    }

    #[test]
    fn test_markers_land_in_category_layer() {
        let mut layers = CategoryLayers::new();
        layers.add_marker(marker(1, 53.07, "amenity", "school"));
        layers.add_marker(marker(2, 53.08, "sport", "soccer"));

        assert_eq!(layers.len(), 2);
        assert_eq!(layers.layer(Category::School).len(), 1);
        assert_eq!(layers.layer(Category::Sport).len(), 1);
        assert!(layers.layer(Category::Other).is_empty());
    }

    #[test]
    fn test_set_visible_reports_change() {
        let mut layers = CategoryLayers::new();
        assert!(layers.is_visible(Category::Sport));
        assert!(layers.set_visible(Category::Sport, false));
        assert!(!layers.set_visible(Category::Sport, false));
        assert!(!layers.is_visible(Category::Sport));
        assert!(layers.set_visible(Category::Sport, true));
    }

    #[test]
    fn test_hidden_layer_excluded_from_buffers_but_kept() {
        let mut layers = CategoryLayers::new();
        layers.add_marker(marker(1, 53.07, "amenity", "school"));
        layers.add_marker(marker(2, 53.08, "sport", "soccer"));
        assert_eq!(layers.visible_buffers().len(), 2);

        layers.set_visible(Category::Sport, false);
        assert_eq!(layers.visible_buffers().len(), 1);
        assert_eq!(layers.snapshot().len(), 2);
        assert_eq!(
            layers.visible_categories(),
            vec![
                Category::School,
                Category::University,
                Category::Pedestrian,
                Category::Other
            ]
        );
    }

    #[test]
    fn test_visible_buffers_stable_order() {
        let mut layers = CategoryLayers::new();
        layers.add_marker(marker(2, 53.08, "sport", "soccer"));
        layers.add_marker(marker(9, 53.06, "amenity", "school"));
        layers.add_marker(marker(1, 53.07, "amenity", "school"));

        let first = layers.visible_buffers();
        let mut rebuilt = CategoryLayers::new();
        for m in layers.snapshot().into_values() {
            rebuilt.add_marker(m);
        }
        assert_eq!(first, rebuilt.visible_buffers());
    }

    #[test]
    fn test_remove_marker() {
        let mut layers = CategoryLayers::new();
        layers.add_marker(marker(1, 53.07, "amenity", "school"));
        let id = EntityId::new("node", 1);

        assert!(layers.get(&id).is_some());
        assert!(layers.remove_marker(&id).is_some());
        assert!(layers.remove_marker(&id).is_none());
        assert!(layers.is_empty());
        assert!(layers.layer(Category::School).is_empty());
    }

    #[test]
    fn test_readd_moves_between_layers() {
        let mut layers = CategoryLayers::new();
        layers.add_marker(marker(1, 53.07, "amenity", "school"));
        layers.add_marker(marker(1, 53.07, "sport", "soccer"));

        assert_eq!(layers.len(), 1);
        assert!(layers.layer(Category::School).is_empty());
        assert_eq!(layers.layer(Category::Sport).len(), 1);
        assert_eq!(
            layers.counts()[Category::Sport.index()],
            (Category::Sport, 1)
        );
    }
}
