use std::{fs, path::Path};

use indexmap::IndexMap;
use thiserror::Error;
use wavefront_obj::obj::{Object, Primitive};

use crate::geometry::{
    FloatType, Ray, Triangle, WorldBox, WorldPoint, WorldVector,
    intersect::{intersect_ray_sphere, intersect_ray_triangle},
};

use super::{LocalShape, SurfacePoint, nearest};

/// Triangle hits closer than this are treated as self intersections.
const MIN_HIT_DISTANCE: FloatType = 0.0001;

/// Indexed triangle mesh in local coordinates.
#[derive(Clone, Debug)]
pub struct Mesh {
    positions: Vec<WorldPoint>,
    normals: Option<Vec<WorldVector>>,
    triangles: Vec<Triangle<usize>>,

    /// Radius of a sphere around the local origin containing all vertices.
    bounding_radius: FloatType,
}

impl Mesh {
    /// Builds a mesh from vertex positions, optional per-vertex normals and a flat
    /// index buffer with three indices per triangle.
    pub fn new(
        positions: Vec<WorldPoint>,
        normals: Option<Vec<WorldVector>>,
        indices: &[u32],
    ) -> Result<Mesh, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(indices.len()));
        }
        if let Some(normals) = &normals {
            if normals.len() != positions.len() {
                return Err(MeshError::NormalCount {
                    positions: positions.len(),
                    normals: normals.len(),
                });
            }
        }

        let vertex_index = |i: u32| {
            let i = i as usize;
            if i < positions.len() {
                Ok(i)
            } else {
                Err(MeshError::IndexOutOfRange {
                    index: i,
                    vertex_count: positions.len(),
                })
            }
        };
        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| {
                Ok(Triangle::new(
                    vertex_index(chunk[0])?,
                    vertex_index(chunk[1])?,
                    vertex_index(chunk[2])?,
                ))
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        let bounding_radius = positions
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, FloatType::max);

        Ok(Mesh {
            positions,
            normals,
            triangles,
            bounding_radius,
        })
    }

    pub fn from_obj(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
        let content = fs::read_to_string(path)?;
        Self::parse_obj(&content)
    }

    /// Loads all triangles of all objects in a Wavefront OBJ text.
    /// Normals are used only if every vertex has one.
    pub fn parse_obj(text: &str) -> Result<Mesh, MeshError> {
        let parsed = wavefront_obj::obj::parse(text)?;

        let mut vertices = IndexMap::new();
        let mut indices = Vec::new();

        for (object_index, object) in parsed.objects.iter().enumerate() {
            for geometry in &object.geometry {
                for shape in &geometry.shapes {
                    let Primitive::Triangle(a, b, c) = shape.primitive else {
                        log::warn!("Skipping non-triangle primitive in {:?}", object.name);
                        continue;
                    };

                    for (vertex, _, normal) in [a, b, c] {
                        let key = (object_index, vertex, normal);
                        let index = match vertices.get_index_of(&key) {
                            Some(index) => index,
                            None => {
                                let data = obj_vertex(object, vertex, normal)?;
                                vertices.insert_full(key, data).0
                            }
                        };
                        indices.push(index as u32);
                    }
                }
            }
        }

        let (positions, normals): (Vec<_>, Vec<_>) = vertices.into_values().unzip();
        let normals: Option<Vec<_>> = normals.into_iter().collect();

        let mesh = Mesh::new(positions, normals, &indices)?;
        mesh.log_statistics();
        Ok(mesh)
    }

    pub fn positions(&self) -> &[WorldPoint] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[WorldVector]> {
        self.normals.as_deref()
    }

    pub fn triangles(&self) -> &[Triangle<usize>] {
        &self.triangles
    }

    pub fn bounding_radius(&self) -> FloatType {
        self.bounding_radius
    }

    /// Axis aligned box around all vertices, `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<WorldBox> {
        WorldBox::from_points(&self.positions)
    }

    pub fn log_statistics(&self) {
        log::info!(
            "Mesh: {} vertices, {} triangles, {} normals",
            self.positions.len(),
            self.triangles.len(),
            if self.normals.is_some() { "vertex" } else { "flat" },
        );
        if let Some(bounds) = self.bounding_box() {
            log::info!(
                "Mesh bounds: center {:?}, size {:?}; bounding radius {:.3}",
                bounds.center(),
                bounds.size(),
                self.bounding_radius
            );
        }
    }

    fn triangle_points(&self, triangle: &Triangle<usize>) -> Triangle<WorldPoint> {
        triangle.map(|&i| self.positions[i])
    }
}

impl LocalShape for Mesh {
    fn intersect_local(&self, ray: &Ray) -> Option<SurfacePoint> {
        // Cheap rejection before scanning the triangles
        intersect_ray_sphere(ray, self.bounding_radius)?;

        let (triangle, distance, uv) = nearest(
            self.triangles.iter().filter_map(|triangle| {
                let points = self.triangle_points(triangle);
                let [e1, e2] = points.edges();
                let (t, uv) = intersect_ray_triangle(ray, &points[0], &e1, &e2)?;
                (t >= MIN_HIT_DISTANCE).then_some((triangle, t, uv))
            }),
            |(_, t, _)| *t,
        )?;

        let points = self.triangle_points(triangle);
        let normal = match &self.normals {
            Some(normals) => uv.interpolate_triangle(&triangle.map(|&i| normals[i])),
            None => points.normal(),
        };

        Some(SurfacePoint {
            distance,
            position: ray.point_at(distance),
            normal,
            tangent: points[1] - points[0],
        })
    }
}

fn obj_vertex(
    object: &Object,
    vertex: usize,
    normal: Option<usize>,
) -> Result<(WorldPoint, Option<WorldVector>), MeshError> {
    let position = object
        .vertices
        .get(vertex)
        .ok_or(MeshError::IndexOutOfRange {
            index: vertex,
            vertex_count: object.vertices.len(),
        })?;
    let normal = normal
        .map(|i| {
            object.normals.get(i).ok_or(MeshError::IndexOutOfRange {
                index: i,
                vertex_count: object.normals.len(),
            })
        })
        .transpose()?;

    Ok((
        WorldPoint::new(position.x, position.y, position.z),
        normal.map(|n| WorldVector::new(n.x, n.y, n.z)),
    ))
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Index count {0} is not a multiple of three")]
    IndexCount(usize),

    #[error("Index {index} out of range of {vertex_count} vertices")]
    IndexOutOfRange { index: usize, vertex_count: usize },

    #[error("Got {normals} normals for {positions} vertices")]
    NormalCount { positions: usize, normals: usize },

    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}
