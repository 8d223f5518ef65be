//! Analytic ray intersection routines.
//!
//! All shapes here are in their local frame (sphere centered at the origin, cylinder axis
//! and planes passing through the origin). Distances are in units of the ray direction
//! length. Missing and degenerate intersections are both reported as `None`.

use super::{BarycentricCoordinates, FloatType, Ray, WorldPoint, WorldVector};

/// Triangles with edge-based determinant below this are treated as parallel to the ray
/// or facing away from it.
pub const TRIANGLE_DETERMINANT_EPSILON: FloatType = 0.00001;

/// Solves `a*x*x + b*x + c = 0`.
///
/// Returns both roots in ascending order. Tangency (single root) is reported as no solution,
/// and so is the linear case.
pub fn solve_quadratic(a: FloatType, b: FloatType, c: FloatType) -> Option<[FloatType; 2]> {
    if a == 0.0 {
        return None;
    }

    let four_ac = 4.0 * a * c;
    let b2 = b * b;

    if b2 <= four_ac {
        return None;
    }

    let sqrt_delta = (b2 - four_ac).sqrt();
    let recip_2a = 1.0 / (2.0 * a);

    let x0 = (-sqrt_delta - b) * recip_2a;
    let x1 = (sqrt_delta - b) * recip_2a;

    // With negative a the roots come out swapped
    if x0 <= x1 {
        Some([x0, x1])
    } else {
        Some([x1, x0])
    }
}

/// Picks the first root in front of the ray from an ascending pair.
/// Negative result means that both roots are behind the ray.
pub fn choose_nearest_positive_root(roots: &[FloatType; 2]) -> FloatType {
    if 0.0 < roots[0] { roots[0] } else { roots[1] }
}

/// Intersects a ray with a sphere centered at the origin.
pub fn intersect_ray_sphere(ray: &Ray, radius: FloatType) -> Option<[FloatType; 2]> {
    let start = ray.origin.coords;

    // t^2 v.v + 2 u.v t + u.u - r^2 = 0
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * start.dot(&ray.direction);
    let c = start.dot(&start) - radius * radius;

    solve_quadratic(a, b, c)
}

/// Intersects a ray with an infinite cylinder whose axis passes through the origin.
///
/// The ray is projected onto the plane orthogonal to the axis, where the cylinder
/// becomes a circle. Projection keeps the ray parametrization, so the roots are valid
/// for the original ray.
pub fn intersect_ray_infinite_cylinder(
    ray: &Ray,
    radius: FloatType,
    axis: &WorldVector,
) -> Option<[FloatType; 2]> {
    let sqr_axis = axis.dot(axis);
    if sqr_axis == 0.0 {
        return None;
    }

    let von = axis.dot(&ray.direction);
    if von == 0.0 {
        // Parallel to the axis
        return None;
    }

    let uon = axis.dot(&ray.origin.coords);
    let recip_sqr_axis = 1.0 / sqr_axis;

    let planar = Ray::new(
        ray.origin - axis * (uon * recip_sqr_axis),
        ray.direction - axis * (von * recip_sqr_axis),
    );

    intersect_ray_sphere(&planar, radius)
}

/// Intersects a ray with a plane passing through the origin.
pub fn intersect_ray_plane(ray: &Ray, normal: &WorldVector) -> Option<FloatType> {
    let von = normal.dot(&ray.direction);
    if von == 0.0 {
        return None;
    }

    let uon = normal.dot(&ray.origin.coords);
    Some(-uon / von)
}

/// Calculates intersection of a ray with a single sided triangle given by a vertex and
/// two edges coming from it.
/// Returns distance along the ray and barycentric coordinates of the hit.
/// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm
pub fn intersect_ray_triangle(
    ray: &Ray,
    origin: &WorldPoint,
    e1: &WorldVector,
    e2: &WorldVector,
) -> Option<(FloatType, BarycentricCoordinates<FloatType>)> {
    let ray_cross_e2 = ray.direction.cross(e2);
    let det = ray_cross_e2.dot(e1);

    if det < TRIANGLE_DETERMINANT_EPSILON {
        return None;
    }

    let s = ray.origin - *origin;

    // u and v are scaled by det until the very end
    let u = ray_cross_e2.dot(&s);
    if u < 0.0 || u > det {
        return None;
    }

    let s_cross_e1 = s.cross(e1);
    let v = s_cross_e1.dot(&ray.direction);
    if v < 0.0 || u + v > det {
        return None;
    }

    let inv_det = 1.0 / det;
    let t = s_cross_e1.dot(e2) * inv_det;

    Some((
        t,
        BarycentricCoordinates {
            u: u * inv_det,
            v: v * inv_det,
        },
    ))
}
