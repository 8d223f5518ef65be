use crate::geometry::{
    FloatType, Ray, WorldVector,
    intersect::{
        choose_nearest_positive_root, intersect_ray_infinite_cylinder, intersect_ray_plane,
        intersect_ray_sphere,
    },
    linear::{orthogonal, project_to_plane},
};

use super::{LocalShape, SurfacePoint};

/// Sphere centered at the local origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub radius: FloatType,
}

impl LocalShape for Sphere {
    fn intersect_local(&self, ray: &Ray) -> Option<SurfacePoint> {
        let roots = intersect_ray_sphere(ray, self.radius)?;
        let t = choose_nearest_positive_root(&roots);
        if t < 0.0 {
            // Sphere is behind the ray
            return None;
        }

        let position = ray.point_at(t);
        let normal = position.coords;
        Some(SurfacePoint {
            distance: t,
            position,
            normal,
            tangent: orthogonal(&normal),
        })
    }
}

/// Capped cylinder, the axis goes from the local origin to `axis`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cylinder {
    pub radius: FloatType,
    pub axis: WorldVector,
}

impl Cylinder {
    fn is_below(&self, p: &WorldVector) -> bool {
        p.dot(&self.axis) < 0.0
    }

    fn is_above(&self, p: &WorldVector) -> bool {
        (p - self.axis).dot(&self.axis) > 0.0
    }

    fn cap_hit(
        &self,
        ray: &Ray,
        cap_origin: &WorldVector,
        normal: WorldVector,
    ) -> Option<SurfacePoint> {
        let shifted = Ray::new(ray.origin - *cap_origin, ray.direction);
        let t = intersect_ray_plane(&shifted, &self.axis)?;
        if t < 0.0 {
            // Cap plane is behind the ray
            return None;
        }

        let position = ray.point_at(t);
        Some(SurfacePoint {
            distance: t,
            position,
            normal,
            tangent: project_to_plane(&normal, &position.coords),
        })
    }
}

impl LocalShape for Cylinder {
    fn intersect_local(&self, ray: &Ray) -> Option<SurfacePoint> {
        let [x0, x1] = intersect_ray_infinite_cylinder(ray, self.radius, &self.axis)?;
        let p0 = ray.point_at(x0).coords;

        if self.is_below(&p0) {
            if self.is_below(&ray.point_at(x1).coords) {
                return None;
            }
            self.cap_hit(ray, &WorldVector::zeros(), -self.axis)
        } else if self.is_above(&p0) {
            if self.is_above(&ray.point_at(x1).coords) {
                return None;
            }
            self.cap_hit(ray, &self.axis, self.axis)
        } else {
            let distance = if x1 < 0.0 {
                return None;
            } else if x0 < 0.0 {
                // Ray starts inside the cylinder
                x1
            } else {
                x0
            };

            let position = ray.point_at(distance);
            Some(SurfacePoint {
                distance,
                position,
                normal: project_to_plane(&self.axis, &position.coords),
                tangent: self.axis,
            })
        }
    }
}
