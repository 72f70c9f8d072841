use crate::maximum_flow::error::WorkerFault;
use crate::maximum_flow::graph::Graph;
use num_traits::{NumAssign, Signed};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// Everything guarded by a node's lock. `flows` holds the flow of each edge this
/// node owns, i.e. each edge whose lower-id endpoint is this node.
#[derive(Debug)]
pub(crate) struct NodeState<Flow> {
    pub height: usize,
    pub excess: Flow,
    pub flows: Vec<Flow>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ArcInfo<Flow> {
    pub u: usize,
    pub v: usize,
    pub capacity: Flow,
    slot: usize,
}

impl<Flow> ArcInfo<Flow>
where
    Flow: NumAssign + Signed + Ord + Copy,
{
    #[inline]
    pub fn other(&self, n: usize) -> usize {
        if n == self.u {
            self.v
        } else {
            self.u
        }
    }

    #[inline]
    pub fn direction(&self, n: usize) -> Direction {
        if n == self.u {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    #[inline]
    pub fn owner(&self) -> usize {
        self.u.min(self.v)
    }

    /// capacity - dir * flow
    #[inline]
    pub fn available(&self, dir: Direction, flow: Flow) -> Flow {
        match dir {
            Direction::Forward => self.capacity - flow,
            Direction::Backward => self.capacity + flow,
        }
    }

    /// Flow slot of this edge, taken from whichever of the two held states owns it.
    /// `xs` is the state of node `x`, `ys` the state of the other endpoint.
    #[inline]
    pub fn flow_mut<'a>(&self, x: usize, xs: &'a mut NodeState<Flow>, ys: &'a mut NodeState<Flow>) -> &'a mut Flow {
        let owner = if x == self.owner() { xs } else { ys };
        &mut owner.flows[self.slot]
    }

    /// flow += dir * amount
    #[inline]
    pub fn apply(dir: Direction, flow: &mut Flow, amount: Flow) {
        match dir {
            Direction::Forward => *flow += amount,
            Direction::Backward => *flow -= amount,
        }
    }
}

/// The shared residual network the workers operate on. Topology is immutable;
/// all mutable state sits behind the per-node locks.
pub(crate) struct Network<Flow> {
    pub num_nodes: usize,
    pub arcs: Vec<ArcInfo<Flow>>,
    start: Vec<usize>,
    adjacency: Vec<usize>,
    nodes: Vec<Mutex<NodeState<Flow>>>,
}

impl<Flow> Network<Flow>
where
    Flow: NumAssign + Signed + Ord + Copy,
{
    pub fn build(graph: &Graph<Flow>) -> Self {
        let num_nodes = graph.num_nodes();

        let mut degree = vec![0; num_nodes];
        let mut owned = vec![0; num_nodes];
        let mut arcs = Vec::with_capacity(graph.num_edges());
        for edge in graph.edges.iter() {
            let (u, v) = (edge.from, edge.to);
            let owner = u.min(v);
            arcs.push(ArcInfo { u, v, capacity: edge.capacity, slot: owned[owner] });
            owned[owner] += 1;
            // self-loops never carry flow
            if u != v {
                degree[u] += 1;
                degree[v] += 1;
            }
        }

        let mut start = vec![0; num_nodes + 1];
        for i in 1..=num_nodes {
            start[i] = start[i - 1] + degree[i - 1];
        }

        let mut counter = vec![0; num_nodes];
        let mut adjacency = vec![usize::MAX; start[num_nodes]];
        for (edge_index, arc) in arcs.iter().enumerate() {
            if arc.u == arc.v {
                continue;
            }
            for n in [arc.u, arc.v] {
                adjacency[start[n] + counter[n]] = edge_index;
                counter[n] += 1;
            }
        }

        let nodes = owned.iter().map(|&k| Mutex::new(NodeState { height: 0, excess: Flow::zero(), flows: vec![Flow::zero(); k] })).collect();

        Self { num_nodes, arcs, start, adjacency, nodes }
    }

    #[inline]
    pub fn adjacency(&self, n: usize) -> &[usize] {
        &self.adjacency[self.start[n]..self.start[n + 1]]
    }

    pub fn lock(&self, n: usize) -> Result<MutexGuard<'_, NodeState<Flow>>, WorkerFault> {
        self.nodes[n].lock().map_err(|_| WorkerFault::PoisonedLock(n))
    }

    /// Locks `a` and `b`, lower id first. Returns the guards in argument order.
    pub fn lock_pair(&self, a: usize, b: usize) -> Result<(MutexGuard<'_, NodeState<Flow>>, MutexGuard<'_, NodeState<Flow>>), WorkerFault> {
        debug_assert_ne!(a, b);
        if a < b {
            let ga = self.lock(a)?;
            let gb = self.lock(b)?;
            Ok((ga, gb))
        } else {
            let gb = self.lock(b)?;
            let ga = self.lock(a)?;
            Ok((ga, gb))
        }
    }

    /// Exclusive access without locking, for setup and read-back.
    pub fn state_mut(&mut self, n: usize) -> Result<&mut NodeState<Flow>, WorkerFault> {
        self.nodes[n].get_mut().map_err(|_| WorkerFault::PoisonedLock(n))
    }

    /// Exclusive access to two distinct nodes without locking, in argument order.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Result<(&mut NodeState<Flow>, &mut NodeState<Flow>), WorkerFault> {
        debug_assert_ne!(a, b);
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.nodes.split_at_mut(high);
        let low_state = head[low].get_mut().map_err(|_| WorkerFault::PoisonedLock(low))?;
        let high_state = tail[0].get_mut().map_err(|_| WorkerFault::PoisonedLock(high))?;
        Ok(if a < b { (low_state, high_state) } else { (high_state, low_state) })
    }

    pub fn edge_flow_mut(&mut self, edge_index: usize) -> Result<&mut Flow, WorkerFault> {
        let (owner, slot) = (self.arcs[edge_index].owner(), self.arcs[edge_index].slot);
        Ok(&mut self.state_mut(owner)?.flows[slot])
    }

    pub fn flow(&mut self, edge_index: usize) -> Result<Flow, WorkerFault> {
        self.edge_flow_mut(edge_index).map(|flow| *flow)
    }

    /// Reads an edge's flow through its owner's lock.
    #[cfg(test)]
    pub fn locked_flow(&self, edge_index: usize) -> Flow {
        let arc = &self.arcs[edge_index];
        self.nodes[arc.owner()].lock().unwrap().flows[arc.slot]
    }

    /// Copies flows and excesses back into `graph`.
    pub fn write_back(&mut self, graph: &mut Graph<Flow>) -> Result<(), WorkerFault> {
        for edge_index in 0..self.arcs.len() {
            graph.edges[edge_index].flow = self.flow(edge_index)?;
        }
        for n in 0..self.num_nodes {
            graph.excesses[n] = self.state_mut(n)?.excess;
        }
        Ok(())
    }
}
