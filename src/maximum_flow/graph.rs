use crate::maximum_flow::error::PreflowError;
use num_traits::{NumAssign, Signed};

/// An edge as the caller sees it. `flow` is negative when flow runs from `to` back to `from`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Edge<Flow> {
    pub from: usize,
    pub to: usize,
    pub capacity: Flow,
    pub flow: Flow,
}

/// Input and output of a solve: nodes are `0..num_nodes()`, edges are numbered
/// in insertion order. A solve fills in `Edge::flow` and the node excesses.
#[derive(Default, Clone, Debug)]
pub struct Graph<Flow> {
    pub(crate) edges: Vec<Edge<Flow>>,
    pub(crate) excesses: Vec<Flow>,
}

impl<Flow> Graph<Flow>
where
    Flow: NumAssign + Signed + Ord + Copy,
{
    pub fn num_nodes(&self) -> usize {
        self.excesses.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn add_node(&mut self) -> usize {
        self.add_nodes(1)[0]
    }

    /// Appends `count` nodes and returns their ids.
    pub fn add_nodes(&mut self, count: usize) -> Vec<usize> {
        let first = self.num_nodes();
        self.excesses.resize(first + count, Flow::zero());
        (first..first + count).collect()
    }

    /// Adds an edge of the given capacity and returns its index, or `None` if an
    /// endpoint is not a node of this graph. Negative capacities are accepted
    /// here and refused by the solvers.
    pub fn add_directed_edge(&mut self, from: usize, to: usize, capacity: Flow) -> Option<usize> {
        let num_nodes = self.num_nodes();
        (from < num_nodes && to < num_nodes).then(|| {
            self.edges.push(Edge { from, to, capacity, flow: Flow::zero() });
            self.edges.len() - 1
        })
    }

    pub fn get_edge(&self, edge_id: usize) -> Option<Edge<Flow>> {
        self.edges.get(edge_id).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<Flow>> {
        self.edges.iter()
    }

    pub fn excess(&self, node: usize) -> Option<Flow> {
        self.excesses.get(node).copied()
    }

    /// Net flow leaving `source`, read from the per-edge flows of the last solve.
    pub fn maximum_flow(&self, source: usize) -> Flow {
        let mut net = Flow::zero();
        for edge in self.edges.iter().filter(|e| e.from != e.to) {
            match (edge.from == source, edge.to == source) {
                (true, _) => net += edge.flow,
                (_, true) => net -= edge.flow,
                _ => {}
            }
        }
        net
    }

    pub(crate) fn validate(&self, source: usize, sink: usize) -> Result<(), PreflowError> {
        let num_nodes = self.num_nodes();
        if let Some(&node) = [source, sink].iter().find(|&&n| n >= num_nodes) {
            return Err(PreflowError::NodeOutOfRange { node, num_nodes });
        }
        if source == sink {
            return Err(PreflowError::SourceEqualsSink(source));
        }
        match self.edges.iter().position(|e| e.capacity < Flow::zero()) {
            Some(edge) => Err(PreflowError::NegativeCapacity { edge }),
            None => Ok(()),
        }
    }
}
