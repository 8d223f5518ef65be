//! Built in demo scene: reflective cubes, spheres, a cylinder and a curved height field
//! under two soft shadowed lights.

use crate::{
    camera::{Camera, Frustum},
    geometry::{
        Color, FloatType, LightColor, WorldPoint, WorldVector,
        linear::{rotation_x, rotation_y},
    },
    scene::{DEFAULT_SOFT_SHADOW_WIDTH, Geometry, Light, Mesh, MeshError, SceneGraph},
};

/// Samples of the height field along each axis.
const MANIFOLD_SAMPLES: usize = 7;

/// Axis aligned cube spanning -1 to 1, faces wound outwards.
pub fn cube() -> Result<Mesh, MeshError> {
    let positions = vec![
        WorldPoint::new(-1.0, -1.0, -1.0),
        WorldPoint::new(1.0, -1.0, -1.0),
        WorldPoint::new(-1.0, 1.0, -1.0),
        WorldPoint::new(1.0, 1.0, -1.0),
        WorldPoint::new(-1.0, -1.0, 1.0),
        WorldPoint::new(1.0, -1.0, 1.0),
        WorldPoint::new(-1.0, 1.0, 1.0),
        WorldPoint::new(1.0, 1.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = [
        0, 2, 1,  1, 2, 3,
        5, 1, 7,  7, 1, 3,
        4, 7, 6,  4, 5, 7,
        6, 3, 2,  6, 7, 3,
        0, 1, 5,  0, 5, 4,
        2, 0, 6,  0, 4, 6,
    ];
    Mesh::new(positions, None, &indices)
}

fn height(x: FloatType, y: FloatType) -> FloatType {
    -0.5 * x * x - 0.75 * y * y
}

/// Curved patch `z = -x²/2 - 3y²/4` over roughly -1 to 1, with smooth vertex normals.
pub fn manifold() -> Result<Mesh, MeshError> {
    const N: usize = MANIFOLD_SAMPLES;
    let half = N as FloatType / 2.0;
    let coordinate = |i: usize| (i as FloatType - half + 0.5) / half;

    let (positions, normals): (Vec<_>, Vec<_>) = (0..N)
        .flat_map(|ix| (0..N).map(move |iy| (coordinate(ix), coordinate(iy))))
        .map(|(x, y)| {
            let p = WorldPoint::new(x, y, height(x, y));
            let dx = WorldPoint::new(x + 0.01, y, height(x + 0.01, y)) - p;
            let dy = WorldPoint::new(x, y + 0.01, height(x, y + 0.01)) - p;
            (p, dx.cross(&dy).normalize())
        })
        .unzip();

    let indices = (0..N - 1)
        .flat_map(|n| (0..N - 1).map(move |m| n * N + m))
        .flat_map(|i0| {
            let i1 = i0 + 1;
            let i2 = i0 + N;
            let i3 = i0 + N + 1;
            [i0, i2, i1, i1, i2, i3]
        })
        .map(|i| i as u32)
        .collect::<Vec<_>>();

    Mesh::new(positions, Some(normals), &indices)
}

/// The two lights of the demo scene.
pub fn demo_lights() -> [Light; 2] {
    [
        WorldPoint::new(1.0, 4.0, -1.0),
        WorldPoint::new(-1.0, 4.0, 3.0),
    ]
    .map(|position| {
        Light::builder()
            .position(position)
            .diffuse(LightColor::new(0.7, 0.7, 0.7))
            .specular(LightColor::new(1.0, 1.0, 1.0))
            .shadow(true)
            .soft_shadow_width(DEFAULT_SOFT_SHADOW_WIDTH)
            .build()
    })
}

pub fn demo_scene() -> Result<SceneGraph, MeshError> {
    let mut red_cube = Geometry::mesh(cube()?);
    red_cube
        .set_color(Color::new(1.0, 0.0, 0.0, 1.0))
        .set_translation(WorldVector::new(-1.0, -1.0, 0.0));

    let mut cyan_sphere = Geometry::sphere(0.5);
    cyan_sphere
        .set_color(Color::new(0.0, 1.0, 1.0, 1.0))
        .set_translation(WorldVector::new(0.0, 1.0, 0.0));

    let mut yellow_manifold = Geometry::mesh(manifold()?);
    yellow_manifold
        .set_color(Color::new(1.0, 1.0, 0.0, 1.0))
        .set_translation(WorldVector::new(1.0, 0.5, 0.0))
        .set_local_transform(rotation_x(90.0));

    let mut orange_sphere = Geometry::sphere(0.25);
    orange_sphere
        .set_color(Color::new(1.0, 0.8, 0.0, 1.0))
        .set_translation(WorldVector::new(1.2, 1.0, 0.8));

    let mut blue_cube = Geometry::mesh(cube()?);
    blue_cube
        .set_color(Color::new(0.0, 0.7, 1.0, 1.0))
        .set_translation(WorldVector::new(0.0, 1.0, -3.0))
        .set_local_transform(rotation_y(10.0));

    let mut cylinder = Geometry::cylinder(0.4, WorldVector::new(0.4, 1.3, -0.5));
    cylinder
        .set_color(Color::new(0.9, 0.9, 0.9, 1.0))
        .set_translation(WorldVector::new(-1.2, 0.7, 0.0))
        .set_local_transform(rotation_x(40.0) * rotation_y(40.0));

    let mut scene = SceneGraph::new();
    let clump = scene.add_clump();
    for mut geometry in [
        red_cube,
        cyan_sphere,
        yellow_manifold,
        orange_sphere,
        blue_cube,
        cylinder,
    ] {
        geometry.set_reflective(true);
        let id = scene.add_geometry(geometry);
        scene.add_geometry_to_clump(clump, id);
    }
    for light in demo_lights() {
        scene.add_light(light);
    }

    Ok(scene)
}

/// Camera above and in front of the demo scene, tilted down towards it.
pub fn demo_camera() -> Camera {
    Camera::builder()
        .frustum(Frustum::new(-1.0, 1.0, -1.0, 1.0, -1.0, -100.0))
        .translation(WorldVector::new(1.0, 2.0, 3.0))
        .transform(rotation_x(-30.0) * rotation_y(15.0))
        .fsaa(true)
        .recursion_depth(3)
        .build()
}
