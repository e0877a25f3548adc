//! Classified markers and their construction.
//!
//! A [`ClassifiedMarker`] is built once when an entity id first appears and
//! then shared by `Arc` until the id disappears from a fetch.

use geo::Polygon;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::classify::{classify, Category};
use crate::error::GeometryError;
use crate::geometry::{BufferEngine, GeometryExtractor, Shape};
use crate::overpass::{EntityId, RawEntity};

/// An entity with its category, display shapes and buffer polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedMarker {
    entity: RawEntity,
    category: Category,
    shapes: Vec<Shape>,
    buffers: Vec<Polygon<f64>>,
}

impl ClassifiedMarker {
    pub fn id(&self) -> &EntityId {
        &self.entity.id
    }

    pub fn entity(&self) -> &RawEntity {
        &self.entity
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Display shapes, one per extracted sub-geometry.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Buffer polygons (`x = lon, y = lat`), one per successfully buffered
    /// sub-geometry. Empty when buffering is disabled.
    pub fn buffers(&self) -> &[Polygon<f64>] {
        &self.buffers
    }
}

/// Builds markers from raw entities.
///
/// Buffering is optional: without a [`BufferEngine`] markers carry no
/// buffers.
#[derive(Debug, Clone, Default)]
pub struct MarkerBuilder {
    extractor: GeometryExtractor,
    buffer: Option<BufferEngine>,
}

impl MarkerBuilder {
    pub fn new(extractor: GeometryExtractor, buffer: Option<BufferEngine>) -> Self {
        Self { extractor, buffer }
    }

    /// Whether this builder computes buffers.
    pub fn buffers_enabled(&self) -> bool {
        self.buffer.is_some()
    }

    /// Classify, extract and buffer one entity.
    ///
    /// Only extraction failures reject the entity. A sub-geometry whose
    /// buffer fails is logged and contributes no buffer.
    pub fn build(&self, entity: RawEntity) -> Result<ClassifiedMarker, GeometryError> {
        let category = classify(&entity.tags);
        let extraction = self.extractor.extract(&entity)?;

        let mut buffers = Vec::new();
        if let Some(engine) = &self.buffer {
            for source in extraction.sources() {
                match engine.buffer(source) {
                    Ok(polygon) => buffers.push(polygon),
                    Err(e) => warn!(
                        entity = %entity.id,
                        category = %category,
                        error = %e,
                        "Buffer failed, marker shown without buffer"
                    ),
                }
            }
        }

        let shapes = extraction.parts.into_iter().map(|p| p.shape).collect();
        Ok(ClassifiedMarker {
            entity,
            category,
            shapes,
            buffers,
        })
    }

    /// Build many markers on the rayon pool, dropping (and logging) entities
    /// whose geometry cannot be extracted. Input order is preserved.
    pub fn build_all(&self, entities: Vec<RawEntity>) -> Vec<ClassifiedMarker> {
        let total = entities.len();
        let markers: Vec<ClassifiedMarker> = entities
            .into_par_iter()
            .filter_map(|entity| {
                let id = entity.id.clone();
                self.build(entity)
                    .inspect_err(|e| warn!(entity = %id, error = %e, "Skipping entity"))
                    .ok()
            })
            .collect();

        debug!(
            built = markers.len(),
            skipped = total - markers.len(),
            "Built markers"
        );
        markers
    }
}
