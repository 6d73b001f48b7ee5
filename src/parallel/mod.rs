//! Generic parallel execution framework
//!
//! This module only manages execution: worker threads, channels, and the
//! join barrier. It knows nothing about converters; callers hand it work
//! items and a processor closure.
//!
//! ```rust
//! use sv_scatter::parallel::ExecutionStrategy;
//!
//! // half of the cores, no absolute cap
//! let workers = ExecutionStrategy::calculate_optimal_workers(0, 50);
//! let strategy = ExecutionStrategy::Parallel { workers };
//!
//! let doubled = strategy
//!     .execute(vec![1, 2, 3], |x, _worker_id| x * 2, None::<fn(usize, usize, usize)>)
//!     .unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

pub mod core;
pub mod progress;

pub use core::{ExecutionStrategy, ParallelExecutor, SequentialExecutor};
pub use progress::ConversionProgress;
