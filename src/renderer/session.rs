use std::sync::Arc;

use crate::{
    camera::Camera,
    geometry::ScreenSize,
    renderer::{Progress, RenderProgress, RenderSettings, render},
    scene::SceneGraph,
    target_buffer::TargetBuffer,
    util::Stats,
};

/// Owns a scene, a camera and the output buffer, runs at most one render pass at a time.
///
/// Scene and camera can only be modified while no pass is running, getting mutable access
/// to them stops the current pass first.
pub struct RenderSession {
    scene: Arc<SceneGraph>,
    camera: Camera,
    settings: RenderSettings,
    buffer: Arc<TargetBuffer>,
    progress: Option<RenderProgress>,
}

impl RenderSession {
    pub fn new(scene: SceneGraph, camera: Camera, settings: RenderSettings) -> Self {
        RenderSession {
            scene: Arc::new(scene),
            camera,
            settings,
            buffer: Arc::new(TargetBuffer::new(ScreenSize::new(0, 0))),
            progress: None,
        }
    }

    /// Starts a new render pass, cancelling any running one first.
    /// The buffer is replaced when the resolution changes, otherwise rows keep their
    /// previous contents until re-rendered.
    pub fn start(&mut self, resolution: ScreenSize) -> anyhow::Result<&RenderProgress> {
        self.start_with_callback(resolution, |_, _| {})
    }

    pub fn start_with_callback<F: Fn(u32, Progress) + Send + Sync + 'static>(
        &mut self,
        resolution: ScreenSize,
        row_callback: F,
    ) -> anyhow::Result<&RenderProgress> {
        self.cancel();

        if self.buffer.size() != resolution {
            log::debug!("Resizing target buffer to {}x{}", resolution.x, resolution.y);
            self.buffer = Arc::new(TargetBuffer::new(resolution));
        }

        let progress = render(
            Arc::clone(&self.scene),
            self.camera,
            self.settings,
            Arc::clone(&self.buffer),
            row_callback,
        )?;
        Ok(self.progress.insert(progress))
    }

    /// Stops the running pass and waits for its workers.
    /// Returns statistics of the stopped pass, if there was one.
    pub fn cancel(&mut self) -> Option<Stats> {
        let mut progress = self.progress.take()?;
        progress.abort();
        Some(progress.wait())
    }

    /// Waits for the running pass to finish.
    pub fn wait(&mut self) -> Option<Stats> {
        let mut progress = self.progress.take()?;
        Some(progress.wait())
    }

    pub fn progress(&self) -> Option<&RenderProgress> {
        self.progress.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|progress| !progress.is_finished())
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Cancels the running pass and gives access to the scene.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        self.cancel();
        Arc::make_mut(&mut self.scene)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Cancels the running pass and gives access to the camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        self.cancel();
        &mut self.camera
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Settings changes apply from the next pass.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn buffer(&self) -> &Arc<TargetBuffer> {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Frustum,
        geometry::{Color, LightColor, WorldPoint, WorldVector},
        renderer::WorkerCount,
        scene::{Geometry, Light},
    };
    use assert2::{assert, let_assert};
    use std::num::NonZeroUsize;

    fn session() -> RenderSession {
        let mut scene = SceneGraph::new();
        let clump = scene.add_clump();
        let mut sphere = Geometry::sphere(1.0);
        sphere
            .set_translation(WorldVector::new(0.0, 0.0, -3.0))
            .set_color(Color::new(1.0, 0.0, 0.0, 1.0));
        let sphere = scene.add_geometry(sphere);
        scene.add_geometry_to_clump(clump, sphere);
        scene.add_light(
            Light::builder()
                .position(WorldPoint::new(0.0, 0.0, 5.0))
                .diffuse(LightColor::new(1.0, 1.0, 1.0))
                .build(),
        );

        let camera = Camera::builder()
            .frustum(Frustum::new(-1.0, 1.0, -1.0, 1.0, -1.0, -100.0))
            .build();
        let settings = RenderSettings {
            worker_count: WorkerCount::Manual(NonZeroUsize::new(2).unwrap()),
            ..Default::default()
        };
        RenderSession::new(scene, camera, settings)
    }

    #[test]
    fn render_and_wait() {
        let mut session = session();
        session.start(ScreenSize::new(5, 5)).unwrap();
        let_assert!(Some(stats) = session.wait());
        assert!(stats.count == 2);
        assert!(!session.is_running());

        let center = session.buffer().pixel(2, 2);
        assert!(center[0] > 0);
        assert!(center[1] == 0);
        assert!(center[3] == 255);
    }

    #[test]
    fn restart_resizes_buffer() {
        let mut session = session();
        session.start(ScreenSize::new(5, 5)).unwrap();
        let first_buffer = Arc::clone(session.buffer());

        session.start(ScreenSize::new(7, 3)).unwrap();
        session.wait();
        assert!(session.buffer().size() == ScreenSize::new(7, 3));
        assert!(!Arc::ptr_eq(&first_buffer, session.buffer()));

        session.start(ScreenSize::new(7, 3)).unwrap();
        let second_buffer = Arc::clone(session.buffer());
        session.wait();
        assert!(Arc::ptr_eq(&second_buffer, session.buffer()));
    }

    #[test]
    fn editing_scene_between_passes() {
        let mut session = session();
        session.start(ScreenSize::new(5, 5)).unwrap();

        session
            .scene_mut()
            .geometry_mut(crate::scene::GeometryId::new(0))
            .set_color(Color::new(0.0, 1.0, 0.0, 1.0));
        assert!(session.progress().is_none());

        session.start(ScreenSize::new(5, 5)).unwrap();
        session.wait();
        let center = session.buffer().pixel(2, 2);
        assert!(center[0] == 0);
        assert!(center[1] > 0);
    }

    #[test]
    fn camera_changes_apply_to_next_pass() {
        let mut session = session();
        session.camera_mut().set_translation(WorldVector::new(0.0, 10.0, 0.0));
        session.start(ScreenSize::new(5, 5)).unwrap();
        session.wait();
        assert!(session.buffer().pixel(2, 2) == [0, 0, 0, 0]);
    }

    #[test]
    fn cancel_without_pass() {
        let mut session = session();
        assert!(session.cancel().is_none());
        assert!(session.wait().is_none());
    }
}
