use crate::maximum_flow::active_pool::ActivePool;
use crate::maximum_flow::error::{PreflowError, WorkerFault};
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::network::{ArcInfo, Network};
use crate::maximum_flow::parallel_push_relabel::{saturate_source, WorkerStats};
use num_traits::{NumAssign, Signed};
use std::fmt::Debug;
use tracing::{debug, trace};

/// Single-threaded preflow-push over the same residual network as
/// [`ParallelPushRelabel`](crate::ParallelPushRelabel).
///
/// Every iteration takes the most recently activated node and does one push
/// along its first admissible edge, or one relabel if it has none. A node
/// that still has excess afterwards goes back on the list. Nothing recurses,
/// so long paths cost heap, not stack.
#[derive(Default)]
pub struct SequentialPushRelabel<Flow> {
    stats: WorkerStats,
    heights: Vec<usize>,
    _flow: std::marker::PhantomData<Flow>,
}

impl<Flow> SequentialPushRelabel<Flow> {
    pub fn new() -> Self {
        Self { stats: WorkerStats::default(), heights: Vec::new(), _flow: std::marker::PhantomData }
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    pub fn heights(&self) -> &[usize] {
        &self.heights
    }
}

impl<Flow> SequentialPushRelabel<Flow>
where
    Flow: NumAssign + Signed + Ord + Copy + Debug,
{
    pub fn solve(&mut self, source: usize, sink: usize, graph: &mut Graph<Flow>) -> Result<Flow, PreflowError> {
        graph.validate(source, sink)?;
        let mut network = Network::build(graph);
        // the network never leaves this thread, so these faults cannot occur in practice
        let to_error = |fault| PreflowError::ConcurrencyFault { worker: 0, fault };
        self.run(&mut network, source, sink).map_err(to_error)?;

        let flow = network.state_mut(sink).map_err(to_error)?.excess;
        self.heights = (0..network.num_nodes).map(|n| network.state_mut(n).map(|s| s.height)).collect::<Result<Vec<_>, _>>().map_err(to_error)?;
        network.write_back(graph).map_err(to_error)?;
        debug!(?flow, pushes = self.stats.pushes, relabels = self.stats.relabels, "sequential preflow finished");
        Ok(flow)
    }

    fn run(&mut self, network: &mut Network<Flow>, source: usize, sink: usize) -> Result<(), WorkerFault> {
        let list = ActivePool::new(network.num_nodes, source, sink);
        saturate_source(network, &list, source)?;
        self.stats = WorkerStats::default();

        while let Some(node) = list.leave() {
            let x = node.id();
            if Self::push(network, &list, x)? {
                self.stats.pushes += 1;
            } else {
                let state = network.state_mut(x)?;
                state.height += 1;
                trace!(node = x, height = state.height, "relabel");
                self.stats.relabels += 1;
                list.enter(x);
            }
        }
        Ok(())
    }

    /// Pushes from `x` along its first admissible edge. Returns false if there is none.
    fn push(network: &mut Network<Flow>, list: &ActivePool, x: usize) -> Result<bool, WorkerFault> {
        let degree = network.adjacency(x).len();
        for k in 0..degree {
            let edge = network.adjacency(x)[k];
            let arc = network.arcs[edge];
            let (nei, dir) = (arc.other(x), arc.direction(x));

            let (xs, ns) = network.pair_mut(x, nei)?;
            let avail = arc.available(dir, *arc.flow_mut(x, xs, ns));
            if avail <= Flow::zero() || xs.height <= ns.height {
                continue;
            }

            let amount = xs.excess.min(avail);
            ArcInfo::apply(dir, arc.flow_mut(x, xs, ns), amount);
            xs.excess -= amount;
            ns.excess += amount;
            trace!(from = x, to = nei, edge, ?amount, "push");

            if xs.excess > Flow::zero() {
                list.enter(x);
            }
            if ns.excess == amount {
                list.enter(nei);
            }
            return Ok(true);
        }
        Ok(false)
    }
}
