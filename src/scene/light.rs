use bon::bon;
use itertools::iproduct;

use crate::geometry::{
    Color, FloatType, LightColor, Ray, TRANSPARENT, WorldPoint, WorldVector,
    linear::{orthogonal, reflect},
};

use super::{HitRecord, SceneGraph};

/// Occluder hits further than this (squared) from the shaded point cast a shadow.
const SHADOW_EPSILON: FloatType = 0.00001;

/// Width used when switching a light from hard to soft shadows.
pub const DEFAULT_SOFT_SHADOW_WIDTH: FloatType = 0.05;

const SOFT_SHADOW_KERNEL: [[FloatType; 3]; 3] = [
    [0.10, 0.15, 0.10],
    [0.15, 0.20, 0.15],
    [0.10, 0.15, 0.10],
];

const DIFFUSE_WIDTH: FloatType = 2.0;
const DIFFUSE_SHARPNESS: FloatType = 0.8;
const SPECULAR_WIDTH: FloatType = 4.0;
const SPECULAR_SHARPNESS: FloatType = 16.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShadowMode {
    Off,
    Hard,
    /// Shadow sampled from a 3x3 grid of lights spaced by the given width.
    Soft(FloatType),
}

/// Point light.
#[derive(Clone, Debug)]
pub struct Light {
    position: WorldPoint,
    diffuse: LightColor,
    specular: LightColor,
    shadow: bool,
    soft_shadow_width: FloatType,
    soft_shadow_kernel: [[FloatType; 3]; 3],
}

#[bon]
impl Light {
    #[builder]
    pub fn new(
        position: WorldPoint,
        #[builder(default)] diffuse: LightColor,
        #[builder(default)] specular: LightColor,
        #[builder(default)] shadow: bool,
        #[builder(default)] soft_shadow_width: FloatType,
    ) -> Self {
        Light {
            position,
            diffuse,
            specular,
            shadow,
            soft_shadow_width,
            soft_shadow_kernel: SOFT_SHADOW_KERNEL,
        }
    }
}

impl Light {
    pub fn position(&self) -> &WorldPoint {
        &self.position
    }

    pub fn set_position(&mut self, position: WorldPoint) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_diffuse(&mut self, diffuse: LightColor) -> &mut Self {
        self.diffuse = diffuse;
        self
    }

    pub fn set_specular(&mut self, specular: LightColor) -> &mut Self {
        self.specular = specular;
        self
    }

    pub fn set_shadow(&mut self, shadow: bool) -> &mut Self {
        self.shadow = shadow;
        self
    }

    pub fn set_soft_shadow_width(&mut self, width: FloatType) -> &mut Self {
        self.soft_shadow_width = width;
        self
    }

    pub fn shadow_mode(&self) -> ShadowMode {
        if !self.shadow {
            ShadowMode::Off
        } else if self.soft_shadow_width == 0.0 {
            ShadowMode::Hard
        } else {
            ShadowMode::Soft(self.soft_shadow_width)
        }
    }

    pub fn set_shadow_mode(&mut self, mode: ShadowMode) -> &mut Self {
        match mode {
            ShadowMode::Off => self.shadow = false,
            ShadowMode::Hard => {
                self.shadow = true;
                self.soft_shadow_width = 0.0;
            }
            ShadowMode::Soft(width) => {
                self.shadow = true;
                self.soft_shadow_width = width;
            }
        }
        self
    }

    /// Switches off -> hard -> soft -> off.
    pub fn cycle_shadow_mode(&mut self) -> ShadowMode {
        let next = match self.shadow_mode() {
            ShadowMode::Off => ShadowMode::Hard,
            ShadowMode::Hard => ShadowMode::Soft(DEFAULT_SOFT_SHADOW_WIDTH),
            ShadowMode::Soft(_) => ShadowMode::Off,
        };
        self.set_shadow_mode(next);
        next
    }

    /// Contribution of this light to a surface point hit by `ray`.
    /// Ray direction and hit normal must be normalized.
    pub fn illuminate(&self, scene: &SceneGraph, ray: &Ray, hit: &HitRecord) -> Color {
        let intensity = match self.shadow_mode() {
            ShadowMode::Off => 1.0,
            ShadowMode::Hard => {
                if is_occluded(scene, &self.position, &hit.position) {
                    return TRANSPARENT;
                }
                1.0
            }
            ShadowMode::Soft(width) => 1.0 - self.shadow_coverage(scene, width, &hit.position),
        };

        self.point_light(hit, &ray.direction, intensity)
    }

    /// Sum of kernel weights of the sample lights that don't see the point.
    fn shadow_coverage(
        &self,
        scene: &SceneGraph,
        width: FloatType,
        point: &WorldPoint,
    ) -> FloatType {
        let z = (point - self.position).normalize();
        let x = orthogonal(&z).normalize();
        let y = z.cross(&x);

        iproduct!(0..3, 0..3)
            .filter(|&(i, j)| {
                let sample = self.position
                    + x * (width * (i as FloatType - 1.0))
                    + y * (width * (j as FloatType - 1.0));
                is_occluded(scene, &sample, point)
            })
            .map(|(i, j)| self.soft_shadow_kernel[i][j])
            .sum()
    }

    fn point_light(&self, hit: &HitRecord, direction: &WorldVector, intensity: FloatType) -> Color {
        let to_light = (self.position - hit.position).normalize();

        let diffuse_angle = angle(&to_light, &hit.normal);
        let diffuse = 1.0 / ((DIFFUSE_WIDTH * diffuse_angle).powf(DIFFUSE_SHARPNESS) + 1.0);

        let reflected = reflect(&hit.normal, direction);
        let specular_angle = angle(&to_light, &reflected);
        let specular = 1.0 / ((SPECULAR_WIDTH * specular_angle).powf(SPECULAR_SHARPNESS) + 1.0);

        let rgb = self.diffuse * (intensity * diffuse) + self.specular * (intensity * specular);
        Color::new(rgb.r, rgb.g, rgb.b, 1.0)
    }
}

/// Angle between two unit vectors
fn angle(a: &WorldVector, b: &WorldVector) -> FloatType {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Checks whether the first thing a ray from the light hits is something else than `point`.
fn is_occluded(scene: &SceneGraph, light_position: &WorldPoint, point: &WorldPoint) -> bool {
    let ray = Ray::new(*light_position, point - light_position);
    scene
        .intersect(&ray)
        .is_some_and(|hit| (hit.position - point).norm_squared() > SHADOW_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Geometry;
    use assert2::assert;
    use test_case::test_case;

    fn white_light(position: WorldPoint) -> Light {
        Light::builder()
            .position(position)
            .diffuse(LightColor::new(0.5, 0.5, 0.5))
            .specular(LightColor::new(0.25, 0.25, 0.25))
            .build()
    }

    /// Big sphere with its top at the origin and a small one floating above it.
    fn scene_with_occluder() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let clump = scene.add_clump();

        let mut floor = Geometry::sphere(100.0);
        floor.set_translation(WorldVector::new(0.0, -100.0, 0.0));
        let floor = scene.add_geometry(floor);
        scene.add_geometry_to_clump(clump, floor);

        let mut occluder = Geometry::sphere(0.5);
        occluder.set_translation(WorldVector::new(0.0, 2.0, 0.0));
        let occluder = scene.add_geometry(occluder);
        scene.add_geometry_to_clump(clump, occluder);

        scene
    }

    /// Point at the top of the floor, seen from the side
    fn top_hit() -> (Ray, HitRecord) {
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 5.0), WorldVector::new(0.0, 0.0, -1.0));
        let hit = HitRecord {
            distance: 5.0,
            position: WorldPoint::origin(),
            normal: WorldVector::y(),
            tangent: WorldVector::x(),
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            reflective: false,
        };
        (ray, hit)
    }

    #[test]
    fn light_along_normal_and_reflection() {
        let scene = SceneGraph::new();
        let light = white_light(WorldPoint::new(0.0, 10.0, 0.0));
        let ray = Ray::new(WorldPoint::new(0.0, 5.0, 0.0), -WorldVector::y());
        let hit = HitRecord {
            distance: 5.0,
            position: WorldPoint::origin(),
            normal: WorldVector::y(),
            tangent: WorldVector::x(),
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            reflective: false,
        };

        let c = light.illuminate(&scene, &ray, &hit);
        assert!((c.r - 0.75).abs() < 1e-12);
        assert!(c.a == 1.0);
    }

    #[test]
    fn grazing_light_is_dim() {
        let scene = SceneGraph::new();
        let light = white_light(WorldPoint::new(10.0, 0.0, 0.0));
        let (ray, hit) = top_hit();

        let c = light.illuminate(&scene, &ray, &hit);
        let expected_diffuse = 0.5 / ((2.0 * std::f64::consts::FRAC_PI_2).powf(0.8) + 1.0);
        assert!(c.r >= expected_diffuse);
        assert!(c.r < 0.5);
        assert!(c.a == 1.0);
    }

    #[test]
    fn hard_shadow_is_transparent_black() {
        let scene = scene_with_occluder();
        let mut light = white_light(WorldPoint::new(0.0, 10.0, 0.0));
        light.set_shadow_mode(ShadowMode::Hard);
        let (ray, hit) = top_hit();

        assert!(light.illuminate(&scene, &ray, &hit) == TRANSPARENT);
    }

    #[test]
    fn unoccluded_hard_shadow_is_lit() {
        let scene = scene_with_occluder();
        let mut light = white_light(WorldPoint::new(10.0, 10.0, 0.0));
        light.set_shadow_mode(ShadowMode::Hard);
        let (ray, hit) = top_hit();

        let c = light.illuminate(&scene, &ray, &hit);
        assert!(c.a == 1.0);
        assert!(c.r > 0.0);
    }

    #[test]
    fn shadows_off_ignore_occluder() {
        let scene = scene_with_occluder();
        let light = white_light(WorldPoint::new(0.0, 10.0, 0.0));
        let (ray, hit) = top_hit();

        let lit = light.illuminate(&SceneGraph::new(), &ray, &hit);
        assert!(light.illuminate(&scene, &ray, &hit) == lit);
    }

    #[test_case(0.01, 0.0; "umbra")]
    #[test_case(100.0, 0.8; "penumbra")]
    fn soft_shadow_intensity(width: FloatType, expected_intensity: FloatType) {
        let scene = scene_with_occluder();
        let mut light = white_light(WorldPoint::new(0.0, 10.0, 0.0));
        let (ray, hit) = top_hit();
        let unshadowed = light.illuminate(&SceneGraph::new(), &ray, &hit);

        light.set_shadow_mode(ShadowMode::Soft(width));
        let c = light.illuminate(&scene, &ray, &hit);
        assert!((c.r - unshadowed.r * expected_intensity).abs() < 1e-9);
        assert!(c.a == 1.0);
    }

    #[test]
    fn shadow_coverage_weights() {
        let scene = scene_with_occluder();
        let light = white_light(WorldPoint::new(0.0, 10.0, 0.0));
        let point = WorldPoint::origin();

        // Only the center sample is blocked
        assert!((light.shadow_coverage(&scene, 100.0, &point) - 0.2).abs() < 1e-12);
        // Everything is blocked
        assert!((light.shadow_coverage(&scene, 0.01, &point) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cycle_shadow_modes() {
        let mut light = white_light(WorldPoint::origin());
        assert!(light.shadow_mode() == ShadowMode::Off);
        assert!(light.cycle_shadow_mode() == ShadowMode::Hard);
        assert!(light.cycle_shadow_mode() == ShadowMode::Soft(DEFAULT_SOFT_SHADOW_WIDTH));
        assert!(light.cycle_shadow_mode() == ShadowMode::Off);
        assert!(light.cycle_shadow_mode() == ShadowMode::Hard);
    }
}
