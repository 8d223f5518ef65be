use index_vec::IndexVec;

use crate::geometry::Ray;

use super::{Geometry, GeometryId, HitRecord, nearest};

/// Ordered group of geometries sharing the scene's geometry arena.
#[derive(Clone, Debug, Default)]
pub struct Clump {
    geometries: Vec<GeometryId>,
}

impl Clump {
    pub fn new() -> Clump {
        Default::default()
    }

    pub fn add_geometry(&mut self, geometry: GeometryId) {
        self.geometries.push(geometry);
    }

    pub fn geometries(&self) -> &[GeometryId] {
        &self.geometries
    }

    /// Closest hit among the clump's geometries, first one wins on ties.
    pub fn intersect(
        &self,
        arena: &IndexVec<GeometryId, Geometry>,
        ray: &Ray,
    ) -> Option<HitRecord> {
        nearest(
            self.geometries.iter().filter_map(|&id| arena[id].intersect(ray)),
            |hit| hit.distance,
        )
    }
}
