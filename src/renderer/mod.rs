mod machinery;
mod session;
mod worker;

use std::num::NonZeroUsize;

use crate::geometry::FloatType;

pub use crate::renderer::machinery::{RenderProgress, render};
pub use crate::renderer::session::RenderSession;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub worker_count: WorkerCount,
    /// Multiplier of every output pixel.
    pub brightness: FloatType,
    /// Render without supersampling regardless of camera settings.
    pub preview: bool,
    /// Each worker renders a coarse subset of its rows first, then refines.
    pub progressive: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            worker_count: WorkerCount::Auto,
            brightness: 1.0,
            preview: false,
            progressive: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per logical CPU.
    Auto,
    Manual(NonZeroUsize),
}

impl WorkerCount {
    pub fn get(&self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get().max(1),
            WorkerCount::Manual(n) => n.get(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub finished: usize,
    pub total: usize,
}

/// Rows owned by a single worker, in the order they get rendered.
///
/// Worker `k` of `n` gets every row `r` with `r % n == k`.
/// In progressive mode every 4th of these rows goes first, then the remaining
/// even ones, then the rest.
pub fn worker_rows(
    worker_id: usize,
    worker_count: usize,
    height: u32,
    progressive: bool,
) -> Vec<u32> {
    let mut rows: Vec<(usize, u32)> = (worker_id as u64..height as u64)
        .step_by(worker_count.max(1))
        .map(|row| row as u32)
        .enumerate()
        .collect();

    if progressive {
        rows.sort_by_key(|&(i, _)| refinement_level(i));
    }

    rows.into_iter().map(|(_, row)| row).collect()
}

fn refinement_level(index: usize) -> u8 {
    if index % 4 == 0 {
        0
    } else if index % 2 == 0 {
        1
    } else {
        2
    }
}
