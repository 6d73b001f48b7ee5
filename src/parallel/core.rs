use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, ScatterError};

/// Fixed-size worker pool for independent work items.
///
/// One producer feeds a bounded channel, `max_workers` threads pull items and
/// run the processor, and the calling thread collects results. `execute`
/// returns only once every item has been processed (the join barrier), with
/// results in submission order.
pub struct ParallelExecutor<T, R> {
    max_workers: usize,
    buffer_size: usize,
    _phantom: std::marker::PhantomData<(T, R)>,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<T, R, F, P> {
    worker_id: usize,
    work_rx: Receiver<(usize, T)>,
    result_tx: Sender<(usize, R)>,
    progress_counter: Arc<AtomicUsize>,
    total_items: usize,
    processor: Arc<F>,
    progress_reporter: Option<Arc<P>>,
}

impl<T, R> ParallelExecutor<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            buffer_size: max_workers * 2,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn execute<F, P>(
        &self,
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
    ) -> Result<Vec<R>>
    where
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static, // (current, total, worker_id)
    {
        if work_items.is_empty() {
            return Ok(Vec::new());
        }

        let actual_workers = std::cmp::min(self.max_workers, work_items.len());
        let (work_tx, work_rx) = bounded::<(usize, T)>(self.buffer_size);
        let (result_tx, result_rx) = bounded::<(usize, R)>(self.buffer_size);

        let progress_counter = Arc::new(AtomicUsize::new(0));
        let total_items = work_items.len();

        let processor = Arc::new(processor);
        let progress_reporter = progress_reporter.map(Arc::new);

        tracing::debug!("Dispatching {} items to {} workers", total_items, actual_workers);

        let indexed = crossbeam::thread::scope(|s| {
            for worker_id in 0..actual_workers {
                let ctx = WorkerContext {
                    worker_id,
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    progress_counter: progress_counter.clone(),
                    total_items,
                    processor: processor.clone(),
                    progress_reporter: progress_reporter.clone(),
                };

                s.spawn(move |_| Self::worker_thread(ctx));
            }

            // Producer thread: send work to workers
            let work_tx_clone = work_tx.clone();
            s.spawn(move |_| {
                for item in work_items.into_iter().enumerate() {
                    if work_tx_clone.send(item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop senders so receivers know when work is done
            drop(work_tx);
            drop(result_tx);

            Self::collect_results(result_rx, total_items)
        })
        .map_err(|_| ScatterError::WorkerPanicked)?;

        if indexed.len() != total_items {
            return Err(ScatterError::WorkerPanicked);
        }
        Ok(indexed)
    }

    fn worker_thread<F, P>(ctx: WorkerContext<T, R, F, P>)
    where
        F: Fn(&T, usize) -> R,
        P: Fn(usize, usize, usize),
    {
        while let Ok((index, work_item)) = ctx.work_rx.recv() {
            let result = (ctx.processor)(&work_item, ctx.worker_id);

            if ctx.result_tx.send((index, result)).is_err() {
                break; // Receiver dropped
            }

            let current = ctx.progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref reporter) = ctx.progress_reporter {
                reporter(current, ctx.total_items, ctx.worker_id);
            }
        }
    }

    fn collect_results(result_rx: Receiver<(usize, R)>, total_items: usize) -> Vec<R> {
        let mut indexed = Vec::with_capacity(total_items);

        while let Ok(result) = result_rx.recv() {
            indexed.push(result);
            if indexed.len() >= total_items {
                break;
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

/// Runs work items one after another on the calling thread
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<T, R, F, P>(work_items: Vec<T>, processor: F, progress_reporter: Option<P>) -> Vec<R>
    where
        F: Fn(&T, usize) -> R,
        P: Fn(usize, usize, usize),
    {
        let total_items = work_items.len();
        let mut results = Vec::with_capacity(total_items);

        for (index, work_item) in work_items.iter().enumerate() {
            results.push(processor(work_item, 0));
            if let Some(reporter) = &progress_reporter {
                reporter(index + 1, total_items, 0);
            }
        }

        results
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn execute<T, R, F, P>(&self, work_items: Vec<T>, processor: F, progress_reporter: Option<P>) -> Result<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
    {
        match self {
            ExecutionStrategy::Sequential => Ok(SequentialExecutor::execute(
                work_items,
                processor,
                progress_reporter,
            )),
            ExecutionStrategy::Parallel { workers } => {
                ParallelExecutor::new(*workers).execute(work_items, processor, progress_reporter)
            }
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => *workers,
        }
    }

    /// Calculate optimal workers based on available system resources and configuration limits
    ///
    /// ```text
    /// 1. Detect available CPU cores: num_cpus::get()
    /// 2. Apply percentage: cores * thread_percentage / 100
    /// 3. Apply config limit: min(max_threads_config, percentage_result) if max_threads_config > 0
    /// 4. Ensure minimum: max(1, final_result)
    /// ```
    ///
    /// The default 50% gives half the cores, leaving the rest of the machine usable.
    pub fn calculate_optimal_workers(max_threads_config: usize, thread_percentage: u8) -> usize {
        Self::workers_for_cores(num_cpus::get(), max_threads_config, thread_percentage)
    }

    fn workers_for_cores(available_cores: usize, max_threads_config: usize, thread_percentage: u8) -> usize {
        let workers_by_percentage = std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        // 0 means use percentage calculation only
        if max_threads_config > 0 {
            std::cmp::min(max_threads_config, workers_by_percentage)
        } else {
            workers_by_percentage
        }
    }
}
