use crate::maximum_flow::active_pool::{ActiveNode, ActivePool};
use crate::maximum_flow::error::{PreflowError, WorkerFault};
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::network::{ArcInfo, Network};
use num_traits::{NumAssign, Signed};
use std::any::Any;
use std::fmt::Debug;
use std::thread;
use tracing::{debug, info, trace, warn};

pub const DEFAULT_WORKER_COUNT: usize = 2;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub pushes: usize,
    pub relabels: usize,
    pub nodes_drained: usize,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SolveStats {
    pub workers: Vec<WorkerStats>,
    /// Number of times a node entered the active pool, initial saturation included.
    pub activations: usize,
}

impl SolveStats {
    pub fn pushes(&self) -> usize {
        self.workers.iter().map(|w| w.pushes).sum()
    }

    pub fn relabels(&self) -> usize {
        self.workers.iter().map(|w| w.relabels).sum()
    }
}

/// Preflow-push where `worker_count` threads race to drain a shared pool of active nodes.
///
/// Each worker owns the node it pulled from the pool until that node's excess is zero.
/// Pushes lock both endpoints of the edge, lower node id first, so two workers
/// scanning in opposite directions cannot deadlock.
pub struct ParallelPushRelabel<Flow> {
    worker_count: usize,
    stats: SolveStats,
    heights: Vec<usize>,
    _flow: std::marker::PhantomData<Flow>,
}

impl<Flow> Default for ParallelPushRelabel<Flow> {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT)
    }
}

/// What one call to `Solver::step` did. Heights are the values seen while the
/// node locks were held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step<Flow> {
    Pushed { to: usize, edge: usize, amount: Flow, height: usize, to_height: usize, drained: bool },
    Relabeled { height: usize },
}

enum WorkerState {
    Fetch,
    Process(ActiveNode),
    Done,
}

impl<Flow> ParallelPushRelabel<Flow> {
    pub fn new(worker_count: usize) -> Self {
        Self { worker_count, stats: SolveStats::default(), heights: Vec::new(), _flow: std::marker::PhantomData }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Counters of the last successful solve.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Final node heights of the last successful solve.
    pub fn heights(&self) -> &[usize] {
        &self.heights
    }
}

impl<Flow> ParallelPushRelabel<Flow>
where
    Flow: NumAssign + Signed + Ord + Copy + Send + Sync + Debug,
{
    /// Returns the maximum flow value from `source` to `sink` and writes the
    /// per-edge flows into `graph`. On error `graph` keeps its previous flows.
    pub fn solve(&mut self, source: usize, sink: usize, graph: &mut Graph<Flow>) -> Result<Flow, PreflowError> {
        graph.validate(source, sink)?;
        if self.worker_count == 0 {
            return Err(PreflowError::NoWorkers);
        }

        let mut network = Network::build(graph);
        let pool = ActivePool::new(network.num_nodes, source, sink);
        saturate_source(&mut network, &pool, source).map_err(|fault| PreflowError::ConcurrencyFault { worker: 0, fault })?;
        info!(nodes = network.num_nodes, edges = network.arcs.len(), workers = self.worker_count, active = pool.len(), "preflow started");

        let solver = Solver { network: &network, pool: &pool };
        let results: Vec<Result<WorkerStats, WorkerFault>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.worker_count).map(|worker| scope.spawn(move || solver.work(worker, |_, _| {}))).collect();
            // join every worker before looking at any result, a failing worker cancels nobody
            handles.into_iter().map(|handle| handle.join().unwrap_or_else(|payload| Err(WorkerFault::Panicked(panic_message(payload))))).collect()
        });

        self.finish(results, &mut network, &pool, sink, graph)
    }

    /// Turns the joined worker results into the solve's outcome. `graph` and the
    /// stats are only written when every worker succeeded.
    fn finish(&mut self, results: Vec<Result<WorkerStats, WorkerFault>>, network: &mut Network<Flow>, pool: &ActivePool, sink: usize, graph: &mut Graph<Flow>) -> Result<Flow, PreflowError> {
        let workers = collect_workers(results)?;
        debug_assert!(pool.is_empty());

        let to_error = |fault| PreflowError::ConcurrencyFault { worker: 0, fault };
        let flow = network.state_mut(sink).map_err(to_error)?.excess;
        self.heights = (0..network.num_nodes).map(|n| network.state_mut(n).map(|s| s.height)).collect::<Result<Vec<_>, _>>().map_err(to_error)?;
        network.write_back(graph).map_err(to_error)?;
        self.stats = SolveStats { workers, activations: pool.entered() };

        info!(?flow, pushes = self.stats.pushes(), relabels = self.stats.relabels(), "preflow finished");
        Ok(flow)
    }
}

/// Fails with the lowest-indexed worker's fault, if any worker failed.
fn collect_workers(results: Vec<Result<WorkerStats, WorkerFault>>) -> Result<Vec<WorkerStats>, PreflowError> {
    let mut workers = Vec::with_capacity(results.len());
    let mut first_fault = None;
    for (worker, result) in results.into_iter().enumerate() {
        match result {
            Ok(stats) => workers.push(stats),
            Err(fault) => {
                warn!(worker, %fault, "worker failed");
                first_fault.get_or_insert(PreflowError::ConcurrencyFault { worker, fault });
            }
        }
    }
    match first_fault {
        Some(error) => Err(error),
        None => Ok(workers),
    }
}

/// Sends the full capacity of every edge at `source` to its other endpoint.
pub(crate) fn saturate_source<Flow>(network: &mut Network<Flow>, pool: &ActivePool, source: usize) -> Result<(), WorkerFault>
where
    Flow: NumAssign + Signed + Ord + Copy,
{
    network.state_mut(source)?.height = network.num_nodes;

    for edge in network.adjacency(source).to_vec() {
        let arc = &network.arcs[edge];
        let (nei, dir, capacity) = (arc.other(source), arc.direction(source), arc.capacity);
        if capacity == Flow::zero() {
            continue;
        }

        ArcInfo::apply(dir, network.edge_flow_mut(edge)?, capacity);
        network.state_mut(source)?.excess -= capacity;
        let state = network.state_mut(nei)?;
        state.excess += capacity;
        if state.excess == capacity {
            pool.enter(nei);
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
pub(crate) struct Solver<'a, Flow> {
    pub network: &'a Network<Flow>,
    pub pool: &'a ActivePool,
}

impl<'a, Flow> Solver<'a, Flow>
where
    Flow: NumAssign + Signed + Ord + Copy + Debug,
{
    /// Runs one worker until the pool is empty. `observe` sees every step with the node it was taken on.
    fn work(self, worker: usize, mut observe: impl FnMut(usize, &Step<Flow>)) -> Result<WorkerStats, WorkerFault> {
        let mut stats = WorkerStats::default();
        let mut state = WorkerState::Fetch;
        loop {
            state = match state {
                WorkerState::Fetch => match self.pool.leave() {
                    Some(node) => WorkerState::Process(node),
                    None => WorkerState::Done,
                },
                WorkerState::Process(node) => {
                    let step = self.step(&node)?;
                    let drained = match step {
                        Step::Pushed { to, edge, amount, drained, .. } => {
                            trace!(worker, from = node.id(), to, edge, ?amount, "push");
                            stats.pushes += 1;
                            drained
                        }
                        Step::Relabeled { height } => {
                            trace!(worker, node = node.id(), height, "relabel");
                            stats.relabels += 1;
                            false
                        }
                    };
                    observe(node.id(), &step);
                    if drained {
                        stats.nodes_drained += 1;
                        WorkerState::Fetch
                    } else {
                        WorkerState::Process(node)
                    }
                }
                WorkerState::Done => break,
            };
        }
        debug!(worker, pushes = stats.pushes, relabels = stats.relabels, drained = stats.nodes_drained, "worker done");
        Ok(stats)
    }

    /// One push or one relabel on `node`. The caller must own `node` and hold none of its locks.
    pub(crate) fn step(&self, node: &ActiveNode) -> Result<Step<Flow>, WorkerFault> {
        let x = node.id();
        for &edge in self.network.adjacency(x) {
            let arc = &self.network.arcs[edge];
            let nei = arc.other(x);
            let dir = arc.direction(x);

            // both guards drop at the end of this probe unless the edge is admissible
            let (mut xs, mut ns) = self.network.lock_pair(x, nei)?;
            let flow = *arc.flow_mut(x, &mut xs, &mut ns);
            let avail = arc.available(dir, flow);
            if avail <= Flow::zero() || xs.height <= ns.height {
                continue;
            }

            let amount = xs.excess.min(avail);
            xs.excess -= amount;
            ns.excess += amount;
            ArcInfo::apply(dir, arc.flow_mut(x, &mut xs, &mut ns), amount);
            if ns.excess == amount {
                self.pool.enter(nei);
            }
            let to_height = ns.height;
            drop(ns);

            let drained = xs.excess == Flow::zero();
            return Ok(Step::Pushed { to: nei, edge, amount, height: xs.height, to_height, drained });
        }

        let mut xs = self.network.lock(x)?;
        xs.height += 1;
        Ok(Step::Relabeled { height: xs.height })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
