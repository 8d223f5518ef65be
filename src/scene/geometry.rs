use crate::geometry::{Color, FloatType, LocalTransform, Ray, WorldVector};

use super::{
    HitRecord, LocalShape, SurfacePoint,
    mesh::Mesh,
    primitives::{Cylinder, Sphere},
};

#[derive(Clone, Debug)]
pub enum Shape {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Mesh(Mesh),
}

impl LocalShape for Shape {
    fn intersect_local(&self, ray: &Ray) -> Option<SurfacePoint> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect_local(ray),
            Shape::Cylinder(cylinder) => cylinder.intersect_local(ray),
            Shape::Mesh(mesh) => mesh.intersect_local(ray),
        }
    }
}

/// A shape placed in the world, with its material.
#[derive(Clone, Debug)]
pub struct Geometry {
    shape: Shape,
    transform: LocalTransform,
    translation: WorldVector,
    color: Color,
    reflective: bool,
}

impl Geometry {
    pub fn new(shape: Shape) -> Geometry {
        Geometry {
            shape,
            transform: LocalTransform::identity(),
            translation: WorldVector::zeros(),
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            reflective: false,
        }
    }

    pub fn sphere(radius: FloatType) -> Geometry {
        Self::new(Shape::Sphere(Sphere { radius }))
    }

    pub fn cylinder(radius: FloatType, axis: WorldVector) -> Geometry {
        Self::new(Shape::Cylinder(Cylinder { radius, axis }))
    }

    pub fn mesh(mesh: Mesh) -> Geometry {
        Self::new(Shape::Mesh(mesh))
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn translation(&self) -> &WorldVector {
        &self.translation
    }

    pub fn set_translation(&mut self, translation: WorldVector) -> &mut Self {
        self.translation = translation;
        self
    }

    pub fn transform(&self) -> &LocalTransform {
        &self.transform
    }

    /// Sets rotation part of the local-to-world mapping, must be orthonormal.
    pub fn set_local_transform(&mut self, transform: LocalTransform) -> &mut Self {
        self.transform = transform;
        self
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    pub fn is_reflective(&self) -> bool {
        self.reflective
    }

    pub fn set_reflective(&mut self, reflective: bool) -> &mut Self {
        self.reflective = reflective;
        self
    }

    /// Intersects a world space ray with the geometry.
    /// Normal and tangent of the hit are not normalized.
    pub fn intersect(&self, ray: &Ray) -> Option<HitRecord> {
        let local = ray.to_local(&self.transform, &self.translation);
        let surface = self.shape.intersect_local(&local)?;

        Some(HitRecord {
            distance: surface.distance,
            position: self.transform * surface.position + self.translation,
            normal: self.transform * surface.normal,
            tangent: self.transform * surface.tangent,
            color: self.color,
            reflective: self.reflective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{
        WorldPoint,
        linear::rotation_y,
        test::{rotation, world_point},
    };
    use assert2::{assert, let_assert};
    use proptest::prop_assert;
    use test_strategy::proptest;

    #[test]
    fn translated_sphere() {
        let mut sphere = Geometry::sphere(1.0);
        sphere
            .set_translation(WorldVector::new(0.0, 0.0, -10.0))
            .set_color(Color::new(1.0, 0.0, 0.0, 1.0))
            .set_reflective(true);

        let ray = Ray::new(WorldPoint::origin(), -WorldVector::z());
        let_assert!(Some(hit) = sphere.intersect(&ray));
        assert!((hit.distance - 9.0).abs() < 1e-12);
        assert!((hit.position - WorldPoint::new(0.0, 0.0, -9.0)).norm() < 1e-12);
        assert!((hit.normal - WorldVector::z()).norm() < 1e-12);
        assert!(hit.color == Color::new(1.0, 0.0, 0.0, 1.0));
        assert!(hit.reflective);
    }

    #[test]
    fn rotated_cylinder() {
        // Axis along local Z, turned to world X
        let mut cylinder = Geometry::cylinder(0.5, WorldVector::new(0.0, 0.0, 2.0));
        cylinder.set_local_transform(rotation_y(90.0));

        let ray = Ray::new(WorldPoint::new(1.0, 5.0, 0.0), -WorldVector::y());
        let_assert!(Some(hit) = cylinder.intersect(&ray));
        assert!((hit.distance - 4.5).abs() < 1e-9);
        assert!((hit.normal.normalize() - WorldVector::y()).norm() < 1e-9);
        assert!((hit.tangent - WorldVector::new(2.0, 0.0, 0.0)).norm() < 1e-9);

        let past_end = Ray::new(WorldPoint::new(2.5, 5.0, 0.0), -WorldVector::y());
        assert!(cylinder.intersect(&past_end) == None);
    }

    #[proptest]
    fn sphere_hit_is_transform_independent(
        #[strategy(rotation())] transform: LocalTransform,
        #[strategy(world_point())] center: WorldPoint,
    ) {
        let mut sphere = Geometry::sphere(1.0);
        sphere
            .set_translation(center.coords)
            .set_local_transform(transform);

        let origin = center + WorldVector::new(0.0, 0.0, 10.0);
        let hit = sphere
            .intersect(&Ray::new(origin, -WorldVector::z()))
            .unwrap();

        prop_assert!((hit.distance - 9.0).abs() < 1e-9);
        prop_assert!((hit.position - (center + WorldVector::z())).norm() < 1e-9);
        prop_assert!((hit.normal - WorldVector::z()).norm() < 1e-9);
    }
}
