pub mod camera;
pub mod demo;
pub mod geometry;
mod renderer;
pub mod scene;
pub mod target_buffer;
mod util;

pub use crate::renderer::{
    Progress, RenderProgress, RenderSession, RenderSettings, WorkerCount, render, worker_rows,
};
pub use camera::{Camera, Frustum};
pub use scene::SceneGraph;
pub use target_buffer::{PixelSink, TargetBuffer};
pub use util::Stats;
