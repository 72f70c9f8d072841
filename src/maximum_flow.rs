mod active_pool;
pub mod error;
pub mod graph;
mod network;
pub mod parallel_push_relabel;
pub mod sequential_push_relabel;
