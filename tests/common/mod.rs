#![allow(dead_code)]

use parallel_preflow::Graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn tracing_init() {
    use tracing_subscriber::prelude::*;

    let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::from_default_env()).with(fmt_layer).try_init().ok();
}

pub fn graph_from(num_nodes: usize, edges: &[(usize, usize, i64)]) -> Graph<i64> {
    let mut graph = Graph::default();
    graph.add_nodes(num_nodes);
    for &(u, v, c) in edges {
        graph.add_directed_edge(u, v, c).unwrap();
    }
    graph
}

/// Random multigraph; parallel edges, self-loops and zero capacities all appear.
pub fn random_graph(seed: u64, num_nodes: usize, num_edges: usize, max_capacity: i64) -> Graph<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::default();
    graph.add_nodes(num_nodes);
    for _ in 0..num_edges {
        let u = rng.gen_range(0..num_nodes);
        let v = rng.gen_range(0..num_nodes);
        graph.add_directed_edge(u, v, rng.gen_range(0..=max_capacity)).unwrap();
    }
    graph
}

/// Checks `|flow| <= capacity` on every edge and that every node other than
/// `source` and `sink` forwards exactly what it receives.
pub fn assert_valid_flow(graph: &Graph<i64>, source: usize, sink: usize, value: i64) {
    let mut net_inflow = vec![0i64; graph.num_nodes()];
    for edge in graph.edges() {
        assert!(edge.flow.abs() <= edge.capacity, "{edge:?} exceeds its capacity");
        net_inflow[edge.to] += edge.flow;
        net_inflow[edge.from] -= edge.flow;
    }
    for node in 0..graph.num_nodes() {
        if node == source || node == sink {
            continue;
        }
        assert_eq!(net_inflow[node], 0, "node {node} does not conserve flow");
        assert_eq!(graph.excess(node), Some(0), "node {node} kept excess");
    }
    assert_eq!(net_inflow[sink], value);
    assert_eq!(graph.excess(sink), Some(value));
    assert_eq!(graph.maximum_flow(source), value);
}
