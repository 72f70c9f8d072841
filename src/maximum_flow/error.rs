use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreflowError {
    #[error("source and sink are the same node ({0})")]
    SourceEqualsSink(usize),

    #[error("node {node} is out of range for a graph with {num_nodes} nodes")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    #[error("edge {edge} has a negative capacity")]
    NegativeCapacity { edge: usize },

    #[error("at least one worker is required")]
    NoWorkers,

    #[error("worker {worker} failed, the computed flow is unreliable: {fault}")]
    ConcurrencyFault { worker: usize, fault: WorkerFault },
}

impl PreflowError {
    /// Configuration errors are raised before anything is mutated.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, PreflowError::ConcurrencyFault { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerFault {
    #[error("lock of node {0} was poisoned")]
    PoisonedLock(usize),

    #[error("panicked: {0}")]
    Panicked(String),
}
