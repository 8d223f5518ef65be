use bon::bon;
use itertools::iproduct;

use crate::{
    geometry::{Color, FloatType, LocalTransform, Ray, ScreenSize, WorldPoint, WorldVector},
    scene::{MAX_RECURSION_DEPTH, SceneGraph},
    target_buffer::PixelSink,
};

/// Supersampling grid size along each axis.
const FSAA_GRID: usize = 4;
/// Spacing of the supersampling rays, relative to pixel spacing.
const FSAA_SPREAD: FloatType = 0.2;

/// View volume in camera space. The camera looks along the near distance,
/// which is negative in the usual right handed setup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    pub left: FloatType,
    pub right: FloatType,
    pub bottom: FloatType,
    pub top: FloatType,
    pub near: FloatType,
    pub far: FloatType,
}

impl Frustum {
    pub fn new(
        left: FloatType,
        right: FloatType,
        bottom: FloatType,
        top: FloatType,
        near: FloatType,
        far: FloatType,
    ) -> Frustum {
        Frustum {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    /// Sets symmetric left/right/bottom/top bounds matching the aspect ratio of the screen,
    /// keeping the diagonal of the view window constant.
    pub fn fit_aspect(&mut self, size: ScreenSize) {
        let aspect = size.y as FloatType / size.x as FloatType;
        let w = (std::f64::consts::SQRT_2 / (aspect * aspect + 1.0)).sqrt();
        let h = aspect * w;

        self.left = -w;
        self.right = w;
        self.bottom = -h;
        self.top = h;
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Camera {
    frustum: Frustum,
    transform: LocalTransform,
    translation: WorldVector,
    recursion_depth: u32,
    fsaa: bool,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        frustum: Frustum,
        #[builder(default = LocalTransform::identity())] transform: LocalTransform,
        #[builder(default = WorldVector::zeros())] translation: WorldVector,
        #[builder(default)] recursion_depth: u32,
        #[builder(default)] fsaa: bool,
    ) -> Self {
        Camera {
            frustum,
            transform,
            translation,
            recursion_depth: recursion_depth.min(MAX_RECURSION_DEPTH),
            fsaa,
        }
    }
}

impl Camera {
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn frustum_mut(&mut self) -> &mut Frustum {
        &mut self.frustum
    }

    pub fn set_frustum(
        &mut self,
        left: FloatType,
        right: FloatType,
        bottom: FloatType,
        top: FloatType,
        near: FloatType,
        far: FloatType,
    ) -> &mut Self {
        self.frustum = Frustum::new(left, right, bottom, top, near, far);
        self
    }

    /// Sets the camera to world rotation, must be orthonormal.
    pub fn set_local_transform(&mut self, transform: LocalTransform) -> &mut Self {
        self.transform = transform;
        self
    }

    pub fn set_translation(&mut self, translation: WorldVector) -> &mut Self {
        self.translation = translation;
        self
    }

    pub fn recursion_depth(&self) -> u32 {
        self.recursion_depth
    }

    /// Depths above `MAX_RECURSION_DEPTH` are clamped.
    pub fn set_recursion_depth(&mut self, depth: u32) -> &mut Self {
        self.recursion_depth = depth.min(MAX_RECURSION_DEPTH);
        self
    }

    pub fn fsaa(&self) -> bool {
        self.fsaa
    }

    pub fn set_fsaa(&mut self, fsaa: bool) -> &mut Self {
        self.fsaa = fsaa;
        self
    }

    /// Camera space distance between neighbouring pixel rays.
    /// Zero along axes with a single pixel.
    pub fn pixel_deltas(&self, resolution: ScreenSize) -> (FloatType, FloatType) {
        let delta = |min: FloatType, max: FloatType, count: u32| {
            if count > 1 {
                (max - min) / (count - 1) as FloatType
            } else {
                0.0
            }
        };
        (
            delta(self.frustum.left, self.frustum.right, resolution.x),
            delta(self.frustum.bottom, self.frustum.top, resolution.y),
        )
    }

    /// Camera space ray through a pixel. Row 0 is the bottom of the frustum.
    pub fn pixel_ray(&self, column: u32, row: u32, deltas: (FloatType, FloatType)) -> Ray {
        Ray::new(
            WorldPoint::origin(),
            WorldVector::new(
                self.frustum.left + column as FloatType * deltas.0,
                self.frustum.bottom + row as FloatType * deltas.1,
                self.frustum.near,
            ),
        )
    }

    /// Traces a camera space ray through the scene.
    pub fn trace(&self, scene: &SceneGraph, ray: &Ray) -> Color {
        let world_ray = ray.to_parent(&self.transform, &self.translation);
        scene.raytrace(&world_ray, self.recursion_depth)
    }

    /// Averages a 4x4 grid of rays around the given camera space ray.
    pub fn trace_fsaa(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        deltas: (FloatType, FloatType),
    ) -> Color {
        let offset = |i: usize, delta: FloatType| (i as FloatType - 2.5) * delta * FSAA_SPREAD;
        let sum = iproduct!(0..FSAA_GRID, 0..FSAA_GRID)
            .map(|(j, i)| {
                let direction = ray.direction
                    + WorldVector::new(offset(i, deltas.0), offset(j, deltas.1), 0.0);
                self.trace(scene, &Ray::new(ray.origin, direction))
            })
            .fold(Color::new(0.0, 0.0, 0.0, 0.0), |sum, color| sum + color);
        sum * (1.0 / (FSAA_GRID * FSAA_GRID) as FloatType)
    }

    pub fn render_pixel(
        &self,
        scene: &SceneGraph,
        column: u32,
        row: u32,
        deltas: (FloatType, FloatType),
        disable_fsaa: bool,
    ) -> Color {
        let ray = self.pixel_ray(column, row, deltas);
        if self.fsaa && !disable_fsaa {
            self.trace_fsaa(scene, &ray, deltas)
        } else {
            self.trace(scene, &ray)
        }
    }

    /// Renders one full row into the sink, scaling every pixel by `brightness`.
    pub fn render_row(
        &self,
        scene: &SceneGraph,
        sink: &impl PixelSink,
        row: u32,
        brightness: FloatType,
        disable_fsaa: bool,
    ) {
        let deltas = self.pixel_deltas(ScreenSize::new(sink.width(), sink.height()));
        let row_offset = row as usize * sink.row_stride();
        for column in 0..sink.width() {
            let color = self.render_pixel(scene, column, row, deltas, disable_fsaa) * brightness;
            sink.put_pixel(row_offset + column as usize, color);
        }
    }
}
