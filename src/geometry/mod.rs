mod aabb;
pub mod intersect;
pub mod linear;
mod triangle;

pub use aabb::AABB;
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f64;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

/// Rotation part of a local-to-world transform.
/// Everything that consumes it assumes the matrix is orthonormal (inverse == transpose),
/// this is not verified anywhere.
pub type LocalTransform = nalgebra::Matrix3<FloatType>;

pub type ScreenSize = nalgebra::Vector2<u32>;

/// Linear RGBA colour, channels nominally in 0-1.
pub type Color = rgb::RGBA<FloatType>;
pub type LightColor = rgb::RGB<FloatType>;

/// Colour of a ray that didn't hit anything.
pub const TRANSPARENT: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, not necessarily normalized.
    /// Hit distances are measured in multiples of this vector.
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }

    pub fn normalized(&self) -> Ray {
        Ray {
            origin: self.origin,
            direction: self.direction.normalize(),
        }
    }

    /// Maps the ray from a local frame to its parent frame.
    pub fn to_parent(&self, transform: &LocalTransform, translation: &WorldVector) -> Ray {
        Ray {
            origin: *transform * self.origin + *translation,
            direction: *transform * self.direction,
        }
    }

    /// Maps the ray from the parent frame to a local frame, inverse of `to_parent`
    /// for orthonormal transforms.
    pub fn to_local(&self, transform: &LocalTransform, translation: &WorldVector) -> Ray {
        let inverse = transform.transpose();
        Ray {
            origin: inverse * (self.origin - *translation),
            direction: inverse * self.direction,
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use proptest::prelude::*;

    /// Floats with limited precision in range -100..100
    pub fn simple_float() -> BoxedStrategy<FloatType> {
        (-1_000_000i64..1_000_000i64)
            .prop_map(|n| n as FloatType * 1e-4)
            .boxed()
    }

    pub fn world_point() -> impl Strategy<Value = WorldPoint> {
        (simple_float(), simple_float(), simple_float())
            .prop_map(|coords| WorldPoint::new(coords.0, coords.1, coords.2))
    }

    pub fn nonzero_vector() -> impl Strategy<Value = WorldVector> {
        (simple_float(), simple_float(), simple_float()).prop_filter_map(
            "vector is too short",
            |coords| {
                let vector = WorldVector::new(coords.0, coords.1, coords.2);
                if vector.norm() < 1e-3 {
                    None
                } else {
                    Some(vector)
                }
            },
        )
    }

    pub fn unit_vector() -> impl Strategy<Value = WorldVector> {
        nonzero_vector().prop_map(|v| v.normalize())
    }

    /// Arbitrary rotation composed from three Euler angles.
    pub fn rotation() -> impl Strategy<Value = LocalTransform> {
        (0.0..360.0, 0.0..360.0, 0.0..360.0).prop_map(|(x, y, z)| {
            linear::rotation_x(x) * linear::rotation_y(y) * linear::rotation_z(z)
        })
    }

    mod ray {
        use super::*;
        use assert2::assert;
        use test_strategy::proptest;

        #[test]
        fn point_at_scales_unnormalized_direction() {
            let ray = Ray::new(
                WorldPoint::new(1.0, 0.0, 0.0),
                WorldVector::new(0.0, 2.0, 0.0),
            );
            assert!(ray.point_at(1.5) == WorldPoint::new(1.0, 3.0, 0.0));
        }

        #[proptest]
        fn local_round_trip(
            #[strategy(rotation())] transform: LocalTransform,
            #[strategy(nonzero_vector())] translation: WorldVector,
            #[strategy(world_point())] origin: WorldPoint,
            #[strategy(nonzero_vector())] direction: WorldVector,
        ) {
            let ray = Ray::new(origin, direction);
            let back = ray
                .to_local(&transform, &translation)
                .to_parent(&transform, &translation);

            prop_assert!((back.origin - ray.origin).norm() < 1e-9);
            prop_assert!((back.direction - ray.direction).norm() < 1e-9);
        }
    }
}
