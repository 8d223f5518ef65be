use std::{
    panic,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use crate::{
    camera::Camera,
    renderer::{Progress, RenderSettings, worker::Worker},
    scene::SceneGraph,
    target_buffer::TargetBuffer,
    util::Stats,
};

/// Starts rendering the scene into the buffer in background threads.
///
/// The callback is called from the worker threads after every finished row.
pub fn render<F: Fn(u32, Progress) + Send + Sync + 'static>(
    scene: Arc<SceneGraph>,
    camera: Camera,
    settings: RenderSettings,
    buffer: Arc<TargetBuffer>,
    row_callback: F,
) -> anyhow::Result<RenderProgress> {
    let size = buffer.size();
    let worker_count = settings.worker_count.get();
    let state = Arc::new(RenderState {
        scene,
        camera,
        settings,
        buffer,

        stop: AtomicBool::new(false),
        finished_rows: AtomicUsize::new(0),
        total_rows: size.y as usize,
    });
    let row_callback: Arc<dyn Fn(u32, Progress) + Send + Sync> = Arc::new(row_callback);

    log::info!(
        "Rendering {}x{} with {} workers",
        size.x,
        size.y,
        worker_count
    );

    let cores = core_affinity::get_core_ids().unwrap_or_default();
    if cores.is_empty() {
        log::debug!("No CPU list available, worker threads will not be pinned");
    }

    let threads = (0..worker_count)
        .map(|worker_id| {
            let state = Arc::clone(&state);
            let row_callback = Arc::clone(&row_callback);
            let core = (!cores.is_empty()).then(|| cores[worker_id % cores.len()]);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let worker = Worker::new(worker_id, worker_count, &state);
                    worker.run(&state, row_callback.as_ref())
                })
        })
        .collect::<Result<Vec<_>, _>>();

    let threads = match threads {
        Ok(threads) => threads,
        Err(e) => {
            // Already spawned workers would keep running with nobody to join them
            state.stop.store(true, Ordering::Release);
            return Err(e.into());
        }
    };

    Ok(RenderProgress {
        render_state: state,
        threads,
    })
}

/// Handle to a running render pass.
/// Dropping it stops the workers and waits for them.
pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<JoinHandle<usize>>,
}

impl RenderProgress {
    /// Return number of finished and total rows.
    pub fn progress(&self) -> Progress {
        Progress {
            finished: self
                .render_state
                .finished_rows
                .load(Ordering::Acquire),
            total: self.render_state.total_rows,
        }
    }

    pub fn progress_percent(&self) -> f32 {
        let progress = self.progress();
        if progress.total == 0 {
            100.0
        } else {
            100.0 * (progress.finished as f32) / (progress.total as f32)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their rows, but no new ones will be started.
    pub fn abort(&self) {
        if !self.render_state.stop.swap(true, Ordering::AcqRel) {
            log::info!("Aborting render");
        }
    }

    /// Block until all workers finish, return statistics of rows rendered per worker.
    /// Panics from the workers are propagated.
    pub fn wait(&mut self) -> Stats {
        let stats = self
            .threads
            .drain(..)
            .map(|handle| match handle.join() {
                Ok(rows) => rows,
                Err(payload) => panic::resume_unwind(payload),
            })
            .collect::<Stats>();

        if stats.count > 0 {
            log::info!(
                "Render finished, {} rows; rows per worker: {}",
                stats.sum,
                stats
            );
        }
        stats
    }

    pub fn buffer(&self) -> &Arc<TargetBuffer> {
        &self.render_state.buffer
    }
}

impl Drop for RenderProgress {
    fn drop(&mut self) {
        self.abort();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::error!("Render worker panicked");
            }
        }
    }
}

pub(crate) struct RenderState {
    pub scene: Arc<SceneGraph>,
    pub camera: Camera,
    pub settings: RenderSettings,
    pub buffer: Arc<TargetBuffer>,

    pub stop: AtomicBool,
    pub finished_rows: AtomicUsize,
    pub total_rows: usize,
}
