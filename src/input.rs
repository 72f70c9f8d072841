//! Reader for the whitespace separated instance format:
//!
//! ```text
//! n m c p
//! u v capacity    (m lines)
//! ```
//!
//! `c` and `p` are present in the input files but carry nothing the solver
//! needs. The source is node `0` and the sink is node `n - 1`.

use crate::maximum_flow::graph::Graph;
use num_traits::{NumAssign, Signed};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input ended while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("{what} is not a valid integer: {token:?}")]
    InvalidInteger { what: &'static str, token: String },

    #[error("edge {edge} has endpoint {node}, but there are only {num_nodes} nodes")]
    EndpointOutOfRange { edge: usize, node: usize, num_nodes: usize },

    #[error("a flow network needs at least two nodes, got {0}")]
    TooFewNodes(usize),
}

pub struct Problem<Flow> {
    pub graph: Graph<Flow>,
    pub source: usize,
    pub sink: usize,
}

pub fn read<Flow, R>(mut reader: R) -> Result<Problem<Flow>, ParseError>
where
    Flow: NumAssign + Signed + Ord + Copy + Default + FromStr,
    R: Read,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

pub fn parse<Flow>(text: &str) -> Result<Problem<Flow>, ParseError>
where
    Flow: NumAssign + Signed + Ord + Copy + Default + FromStr,
{
    let mut tokens = Tokens(text.split_ascii_whitespace());

    let num_nodes: usize = tokens.next("node count")?;
    let num_edges: usize = tokens.next("edge count")?;
    let _: usize = tokens.next("c")?;
    let _: usize = tokens.next("p")?;
    if num_nodes < 2 {
        return Err(ParseError::TooFewNodes(num_nodes));
    }

    let mut graph = Graph::default();
    graph.add_nodes(num_nodes);
    for edge in 0..num_edges {
        let u: usize = tokens.next("edge tail")?;
        let v: usize = tokens.next("edge head")?;
        let capacity: Flow = tokens.next("capacity")?;
        if graph.add_directed_edge(u, v, capacity).is_none() {
            let node = if u >= num_nodes { u } else { v };
            return Err(ParseError::EndpointOutOfRange { edge, node, num_nodes });
        }
    }

    Ok(Problem { graph, source: 0, sink: num_nodes - 1 })
}

struct Tokens<'a>(std::str::SplitAsciiWhitespace<'a>);

impl Tokens<'_> {
    fn next<T: FromStr>(&mut self, what: &'static str) -> Result<T, ParseError> {
        let token = self.0.next().ok_or(ParseError::UnexpectedEof(what))?;
        token.parse().map_err(|_| ParseError::InvalidInteger { what, token: token.to_string() })
    }
}
