// Copyright 2025 the Sbr Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Processing batches of frames on a thread pool.

use std::cell::RefCell;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thread_local::ThreadLocal;

use crate::frame::{Frame, VideoInfo};
use crate::processor::Sbr;
use crate::{Result, Sample, SbrConfig};

/// Filters independent frames in parallel.
///
/// Every worker thread lazily clones a validated template instance, so each thread works with
/// its own scratch storage and no instance is ever shared between threads.
#[derive(Debug)]
pub struct ParallelSbr<T: Sample> {
    pool: ThreadPool,
    workers: ThreadLocal<RefCell<Sbr<T>>>,
    template: Sbr<T>,
}

impl<T: Sample> ParallelSbr<T> {
    /// Validate the format and build a pool of `num_threads` workers.
    ///
    /// A `num_threads` of zero lets `rayon` pick the number of threads.
    pub fn new(info: &VideoInfo, config: SbrConfig, num_threads: usize) -> Result<Self> {
        let template = Sbr::new(info, config)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("sbr-worker-{index}"))
            .build()?;
        log::debug!(
            "parallel filter with {} threads on the {} path",
            pool.current_num_threads(),
            template.execution_path()
        );
        Ok(Self {
            pool,
            workers: ThreadLocal::new(),
            template,
        })
    }

    /// The number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// The instance every worker is cloned from.
    pub fn template(&self) -> &Sbr<T> {
        &self.template
    }

    /// Filter every frame, returning the outputs in input order.
    pub fn process_frames(&mut self, frames: &[Frame<T>]) -> Vec<Frame<T>> {
        let workers = &self.workers;
        let template = &self.template;
        self.pool.install(|| {
            frames
                .par_iter()
                .map(|frame| {
                    let worker = workers.get_or(|| RefCell::new(template.clone()));
                    worker.borrow_mut().process(frame)
                })
                .collect()
        })
    }
}
