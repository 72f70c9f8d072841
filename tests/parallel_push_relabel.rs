mod common;

use common::{assert_valid_flow, graph_from, random_graph, tracing_init};
use parallel_preflow::{Graph, ParallelPushRelabel, PreflowError, SequentialPushRelabel};
use rstest::rstest;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn solve(workers: usize, source: usize, sink: usize, graph: &mut Graph<i64>) -> i64 {
    ParallelPushRelabel::new(workers).solve(source, sink, graph).unwrap()
}

fn reference(source: usize, sink: usize, graph: &Graph<i64>) -> i64 {
    let mut graph = graph.clone();
    let flow = SequentialPushRelabel::new().solve(source, sink, &mut graph).unwrap();
    assert_valid_flow(&graph, source, sink, flow);
    flow
}

#[rstest]
#[case::diamond_with_cross_edge(4, &[(0, 1, 10), (0, 2, 5), (1, 3, 5), (2, 3, 10), (1, 2, 2)], 12)]
#[case::two_parallel_paths(4, &[(0, 1, 3), (1, 3, 3), (0, 2, 7), (2, 3, 7)], 10)]
#[case::direct_edge(2, &[(0, 1, 42)], 42)]
#[case::disconnected(4, &[(0, 1, 5), (2, 3, 5)], 0)]
#[case::no_edges(2, &[], 0)]
#[case::parallel_edges(3, &[(0, 1, 2), (0, 1, 3), (1, 2, 4), (1, 2, 4)], 5)]
#[case::reversed_edges_carry_flow(3, &[(1, 0, 4), (2, 1, 6)], 4)]
#[case::bottleneck_chain(5, &[(0, 1, 9), (1, 2, 1), (2, 3, 9), (3, 4, 9)], 1)]
fn known_instances(#[case] num_nodes: usize, #[case] edges: &[(usize, usize, i64)], #[case] expected: i64, #[values(1, 2, 4, 8)] workers: usize) {
    tracing_init();
    let sink = num_nodes - 1;
    let mut graph = graph_from(num_nodes, edges);

    let flow = solve(workers, 0, sink, &mut graph);

    assert_eq!(flow, expected);
    assert_valid_flow(&graph, 0, sink, flow);
    assert_eq!(reference(0, sink, &graph_from(num_nodes, edges)), expected);
}

#[rstest]
fn direct_edge_never_activates_a_node(#[values(1, 2, 4)] workers: usize) {
    let mut graph = graph_from(2, &[(0, 1, 17)]);
    let mut solver = ParallelPushRelabel::new(workers);

    assert_eq!(solver.solve(0, 1, &mut graph), Ok(17));
    assert_eq!(solver.stats().activations, 0);
    assert_eq!(solver.stats().pushes(), 0);
    assert_eq!(solver.stats().relabels(), 0);
    assert_eq!(solver.stats().workers.len(), workers);
}

#[test]
fn source_starts_at_node_count_and_heights_only_grow() {
    let mut graph = graph_from(4, &[(0, 1, 10), (0, 2, 5), (1, 3, 5), (2, 3, 10), (1, 2, 2)]);
    let mut solver = ParallelPushRelabel::new(2);
    solver.solve(0, 3, &mut graph).unwrap();

    assert_eq!(solver.heights()[0], 4);
    assert_eq!(solver.heights()[3], 0);
    assert!(solver.heights()[1] >= 1);
    assert!(solver.heights()[2] >= 1);
    assert!(solver.stats().pushes() > 0);
}

#[test]
fn default_solver_uses_two_workers() {
    assert_eq!(ParallelPushRelabel::<i64>::default().worker_count(), 2);
}

#[rstest]
#[case::source_is_sink(1, 1, PreflowError::SourceEqualsSink(1))]
#[case::source_out_of_range(9, 3, PreflowError::NodeOutOfRange { node: 9, num_nodes: 4 })]
#[case::sink_out_of_range(0, 4, PreflowError::NodeOutOfRange { node: 4, num_nodes: 4 })]
fn bad_endpoints_are_refused(#[case] source: usize, #[case] sink: usize, #[case] expected: PreflowError) {
    let mut graph = graph_from(4, &[(0, 1, 1), (1, 3, 1)]);
    let error = ParallelPushRelabel::new(2).solve(source, sink, &mut graph).unwrap_err();
    assert_eq!(error, expected);
    assert!(error.is_configuration_error());
}

#[test]
fn negative_capacity_is_refused_before_anything_changes() {
    let mut graph = graph_from(3, &[(0, 1, 4), (1, 2, -2)]);
    let error = ParallelPushRelabel::new(2).solve(0, 2, &mut graph).unwrap_err();
    assert_eq!(error, PreflowError::NegativeCapacity { edge: 1 });
    assert!(graph.edges().all(|edge| edge.flow == 0));
    assert_eq!(graph.excess(1), Some(0));
}

#[rstest]
fn matches_reference_on_random_graphs(#[values(1, 2, 4, 16)] workers: usize, #[values(1, 2, 3, 4, 5, 6, 7, 8)] seed: u64) {
    tracing_init();
    let num_nodes = 10 + (seed as usize) * 7;
    let graph = random_graph(seed, num_nodes, num_nodes * 4, 50);
    let sink = num_nodes - 1;

    let mut solved = graph.clone();
    let flow = solve(workers, 0, sink, &mut solved);

    assert_eq!(flow, reference(0, sink, &graph));
    assert_valid_flow(&solved, 0, sink, flow);
}

#[test]
fn result_does_not_depend_on_worker_count() {
    let graph = random_graph(99, 60, 300, 1000);
    let results: Vec<i64> = [1, 2, 3, 4, 8, 16].iter().map(|&workers| solve(workers, 0, 59, &mut graph.clone())).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]), "{results:?}");
}

#[test]
fn independent_solves_agree() {
    let graph = random_graph(7, 40, 160, 30);
    let first = solve(4, 0, 39, &mut graph.clone());
    let second = solve(4, 0, 39, &mut graph.clone());
    assert_eq!(first, second);

    // solving again over a graph that already carries flows starts from scratch
    let mut reused = graph.clone();
    solve(4, 0, 39, &mut reused);
    assert_eq!(solve(3, 0, 39, &mut reused), first);
    assert_valid_flow(&reused, 0, 39, first);
}

#[test]
fn inner_source_and_sink() {
    let graph = random_graph(21, 30, 120, 20);
    let mut solved = graph.clone();
    let flow = solve(4, 11, 5, &mut solved);
    assert_eq!(flow, reference(11, 5, &graph));
    assert_valid_flow(&solved, 11, 5, flow);
}

// Heavy contention on few nodes: many workers, dense parallel edges. A lock
// ordering mistake shows up here as a hang, so the solve runs on its own thread
// under a deadline.
#[test]
fn many_workers_on_dense_graphs_finish() {
    for seed in 100..120u64 {
        let graph = random_graph(seed, 12, 400, 100);
        let expected = reference(0, 11, &graph);

        let (sender, receiver) = mpsc::channel();
        let mut solved = graph.clone();
        thread::spawn(move || {
            let result = ParallelPushRelabel::new(16).solve(0, 11, &mut solved).map(|flow| (flow, solved));
            sender.send(result).ok();
        });

        let (flow, solved) = receiver.recv_timeout(Duration::from_secs(60)).expect("solve did not finish, suspect a deadlock").unwrap();
        assert_eq!(flow, expected, "seed {seed}");
        assert_valid_flow(&solved, 0, 11, flow);
    }
}
