pub const DEFAULT_KNN: usize = 5;
pub const DEFAULT_WINDOW_SIZE: usize = 5;
pub const DEFAULT_SLIDE: usize = 1;

pub type Mat = nalgebra::DMatrix<f64>;

pub use indicatif::ParallelProgressIterator;
pub use log::{debug, info, warn};
pub use rayon::prelude::*;
pub use std::collections::{HashMap, HashSet};

/// Create a worker pool for `n_jobs` threads (0 = all logical CPUs)
pub fn create_thread_pool(n_jobs: usize) -> anyhow::Result<rayon::ThreadPool> {
    let num_threads = if n_jobs == 0 { num_cpus::get() } else { n_jobs };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create a pool of {} threads: {}", num_threads, e))
}
