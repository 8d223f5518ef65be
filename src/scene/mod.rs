mod clump;
mod geometry;
mod light;
mod mesh;
pub mod primitives;

use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use crate::geometry::{
    Color, FloatType, Ray, TRANSPARENT, WorldPoint, WorldVector,
    linear::{multiply_rgb, reflect},
};

pub use clump::Clump;
pub use geometry::{Geometry, Shape};
pub use light::{DEFAULT_SOFT_SHADOW_WIDTH, Light, ShadowMode};
pub use mesh::{Mesh, MeshError};

/// Reflected rays start this far (in multiples of the unit direction) from the surface,
/// to avoid hitting it again.
const REFLECTION_OFFSET: FloatType = 0.5;
const SHADE_WEIGHT: FloatType = 0.7;
const REFLECTION_WEIGHT: FloatType = 0.4;

/// Deepest reflection recursion traced, larger depths are clamped to this.
pub const MAX_RECURSION_DEPTH: u32 = 16;

/// Shape that can be intersected in its own local coordinates.
pub trait LocalShape {
    fn intersect_local(&self, ray: &Ray) -> Option<SurfacePoint>;
}

/// Ray hit on a shape, before any material is applied.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfacePoint {
    /// Ray parameter of the hit.
    pub distance: FloatType,
    pub position: WorldPoint,
    pub normal: WorldVector,
    pub tangent: WorldVector,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    /// Ray parameter of the hit, in multiples of the ray direction.
    pub distance: FloatType,
    pub position: WorldPoint,
    /// Not necessarily normalized.
    pub normal: WorldVector,
    /// Not necessarily normalized.
    pub tangent: WorldVector,
    pub color: Color,
    pub reflective: bool,
}

/// Returns the candidate with the smallest distance, the first one on ties.
pub(crate) fn nearest<T>(
    candidates: impl Iterator<Item = T>,
    distance: impl Fn(&T) -> FloatType,
) -> Option<T> {
    candidates.min_by_key(|candidate| OrderedFloat(distance(candidate)))
}

index_vec::define_index_type! {
    pub struct GeometryId = u32;
}

index_vec::define_index_type! {
    pub struct ClumpId = u32;
}

index_vec::define_index_type! {
    pub struct LightId = u32;
}

/// Everything that gets rendered: geometries grouped into clumps, and lights.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    geometries: IndexVec<GeometryId, Geometry>,
    clumps: IndexVec<ClumpId, Clump>,
    lights: IndexVec<LightId, Light>,
}

impl SceneGraph {
    pub fn new() -> SceneGraph {
        Default::default()
    }

    /// Stores a geometry in the scene. It is not rendered until added to a clump.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry)
    }

    pub fn add_clump(&mut self) -> ClumpId {
        self.clumps.push(Clump::new())
    }

    pub fn add_geometry_to_clump(&mut self, clump: ClumpId, geometry: GeometryId) {
        self.clumps[clump].add_geometry(geometry);
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.push(light)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id]
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> &mut Geometry {
        &mut self.geometries[id]
    }

    pub fn clump(&self, id: ClumpId) -> &Clump {
        &self.clumps[id]
    }

    pub fn light(&self, id: LightId) -> &Light {
        &self.lights[id]
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut Light {
        &mut self.lights[id]
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn lights_mut(&mut self) -> impl Iterator<Item = &mut Light> {
        self.lights.iter_mut()
    }

    /// Advances the shadow mode of every light, see `Light::cycle_shadow_mode`.
    pub fn cycle_shadow_modes(&mut self) {
        for light in self.lights.iter_mut() {
            let mode = light.cycle_shadow_mode();
            log::info!("Light {:?}: shadows {:?}", light.position(), mode);
        }
    }

    /// Closest hit over all clumps.
    pub fn intersect(&self, ray: &Ray) -> Option<HitRecord> {
        nearest(
            self.clumps
                .iter()
                .filter_map(|clump| clump.intersect(&self.geometries, ray)),
            |hit| hit.distance,
        )
    }

    /// Colour seen along a ray, following up to `depth` reflections.
    pub fn raytrace(&self, ray: &Ray, depth: u32) -> Color {
        let depth = depth.min(MAX_RECURSION_DEPTH);
        let Some(mut hit) = self.intersect(ray) else {
            return TRANSPARENT;
        };

        let ray = ray.normalized();
        hit.normal = hit.normal.normalize();
        if let Some(tangent) = hit.tangent.try_normalize(0.0) {
            hit.tangent = tangent;
        }

        let shade = self.shade(&ray, &hit);

        let color = if depth > 0 && hit.reflective {
            let direction = reflect(&hit.normal, &ray.direction);
            let reflected_ray = Ray::new(hit.position + direction * REFLECTION_OFFSET, direction);
            let reflected = self.raytrace(&reflected_ray, depth - 1);
            shade * SHADE_WEIGHT + reflected * REFLECTION_WEIGHT
        } else {
            shade
        };

        multiply_rgb(color, &hit.color)
    }

    /// Sum of direct illumination from all lights.
    pub fn shade(&self, ray: &Ray, hit: &HitRecord) -> Color {
        self.lights
            .iter()
            .fold(TRANSPARENT, |sum, light| sum + light.illuminate(self, ray, hit))
    }
}
