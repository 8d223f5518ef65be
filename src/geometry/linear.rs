use nalgebra::{Rotation3, Vector3};

use super::{Color, FloatType, LocalTransform, WorldVector};

/// Mirrors the incident direction about a plane with the given unit normal.
pub fn reflect(normal: &WorldVector, incident: &WorldVector) -> WorldVector {
    incident - normal * (2.0 * incident.dot(normal))
}

/// Returns some vector orthogonal to `v`. Not normalized, zero only if `v` is zero.
pub fn orthogonal(v: &WorldVector) -> WorldVector {
    if v.x.abs() > v.z.abs() {
        WorldVector::new(-v.y, v.x, 0.0)
    } else {
        WorldVector::new(0.0, -v.z, v.y)
    }
}

/// Removes the component of `v` along `normal`. `normal` doesn't need to be normalized.
pub fn project_to_plane(normal: &WorldVector, v: &WorldVector) -> WorldVector {
    v - normal * (v.dot(normal) / normal.dot(normal))
}

pub fn rotation_x(degrees: FloatType) -> LocalTransform {
    Rotation3::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()).into_inner()
}

pub fn rotation_y(degrees: FloatType) -> LocalTransform {
    Rotation3::from_axis_angle(&Vector3::y_axis(), degrees.to_radians()).into_inner()
}

pub fn rotation_z(degrees: FloatType) -> LocalTransform {
    Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()).into_inner()
}

/// Multiplies RGB channels by a material colour, keeps alpha.
pub fn multiply_rgb(color: Color, material: &Color) -> Color {
    Color {
        r: color.r * material.r,
        g: color.g * material.g,
        b: color.b * material.b,
        a: color.a,
    }
}
