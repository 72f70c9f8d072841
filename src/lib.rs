pub mod input;
pub mod maximum_flow;

pub use maximum_flow::error::{PreflowError, WorkerFault};
pub use maximum_flow::graph::{Edge, Graph};
pub use maximum_flow::parallel_push_relabel::{ParallelPushRelabel, SolveStats, WorkerStats, DEFAULT_WORKER_COUNT};
pub use maximum_flow::sequential_push_relabel::SequentialPushRelabel;
