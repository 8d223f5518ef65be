use std::sync::atomic::Ordering;

use crate::renderer::{Progress, machinery::RenderState, worker_rows};

pub struct Worker {
    id: usize,
    rows: Vec<u32>,
}

impl Worker {
    pub fn new(id: usize, worker_count: usize, state: &RenderState) -> Self {
        Self {
            id,
            rows: worker_rows(
                id,
                worker_count,
                state.buffer.size().y,
                state.settings.progressive,
            ),
        }
    }

    /// Renders the worker's rows until done or stopped.
    /// Returns number of rows rendered.
    pub fn run(
        &self,
        state: &RenderState,
        row_callback: &(dyn Fn(u32, Progress) + Send + Sync),
    ) -> usize {
        log::debug!("Worker {} starting with {} rows", self.id, self.rows.len());

        let mut rendered = 0;
        for &row in &self.rows {
            if state.stop.load(Ordering::Acquire) {
                log::debug!("Worker {} stopped after {} rows", self.id, rendered);
                return rendered;
            }

            state.camera.render_row(
                &state.scene,
                state.buffer.as_ref(),
                row,
                state.settings.brightness,
                state.settings.preview,
            );
            rendered += 1;

            let finished = state.finished_rows.fetch_add(1, Ordering::AcqRel) + 1;
            row_callback(
                row,
                Progress {
                    finished,
                    total: state.total_rows,
                },
            );
        }

        log::debug!("Worker {} finished", self.id);
        rendered
    }
}
