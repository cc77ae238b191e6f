#![no_main]

//! Arbitrary bytes become an adjacency list: byte 0 picks directedness and
//! node count, every following pair is an edge `a % n -> b % n`. Both DFS
//! strategies must produce the same callback sequence, cycle detection
//! must agree between them, and BFS must visit the same node set.

use std::cell::RefCell;

use graphwalk_core::{
    BreadthFirstSearch, DepthFirstSearch, EdgeInfo, Strategy, TraversalError, TraversalOptions,
    TraversalOrder, Visit,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Node(u8),
    Edge(u8, u8, EdgeInfo),
}

fn decode(data: &[u8]) -> Option<(bool, Vec<Vec<u8>>)> {
    let (&head, rest) = data.split_first()?;
    let directed = head & 0x80 == 0;
    let n = (head & 0x3f) + 1;
    let mut adj = vec![Vec::new(); usize::from(n)];
    for pair in rest.chunks_exact(2) {
        let (a, b) = (pair[0] % n, pair[1] % n);
        adj[usize::from(a)].push(b);
        if !directed {
            adj[usize::from(b)].push(a);
        }
    }
    Some((directed, adj))
}

fn dfs(
    adj: &[Vec<u8>],
    directed: bool,
    order: TraversalOrder,
    strategy: Strategy,
    detect_cycles: bool,
) -> (Vec<Event>, Option<Vec<u8>>) {
    let events = RefCell::new(Vec::new());
    let result = {
        let options = TraversalOptions::builder()
            .directed(directed)
            .node_hash(|n: &u8| Ok(n.to_string()))
            .children(|n: &u8| Ok(adj[usize::from(*n)].clone()))
            .process_node(|n: &u8| {
                events.borrow_mut().push(Event::Node(*n));
                Ok(Visit::Continue)
            })
            .process_edge(|a: &u8, b: &u8, info: EdgeInfo| {
                events.borrow_mut().push(Event::Edge(*a, *b, info));
                Ok(())
            })
            .build()
            .expect("options");
        let mut search = if detect_cycles {
            DepthFirstSearch::with_cycle_detection(options)
        } else {
            DepthFirstSearch::new(options)
        };
        search.perform(0, order, strategy)
    };
    let cycle = match result {
        Ok(()) => None,
        Err(TraversalError::Cycle(cycle)) => Some(cycle.into_path()),
        Err(err) => panic!("unexpected error: {err}"),
    };
    (events.into_inner(), cycle)
}

fn bfs_nodes(adj: &[Vec<u8>], directed: bool) -> Vec<u8> {
    let mut seen = Vec::new();
    {
        let options = TraversalOptions::builder()
            .directed(directed)
            .node_hash(|n: &u8| Ok(n.to_string()))
            .children(|n: &u8| Ok(adj[usize::from(*n)].clone()))
            .process_node(|n: &u8| {
                seen.push(*n);
                Ok(Visit::Continue)
            })
            .build()
            .expect("options");
        BreadthFirstSearch::new(options)
            .perform(0, TraversalOrder::PreOrder)
            .expect("bfs");
    }
    seen.sort_unstable();
    seen
}

fuzz_target!(|data: &[u8]| {
    let Some((directed, adj)) = decode(data) else {
        return;
    };

    for order in [TraversalOrder::PreOrder, TraversalOrder::PostOrder] {
        for detect_cycles in [false, true] {
            let recursive = dfs(&adj, directed, order, Strategy::Recursive, detect_cycles);
            let iterative = dfs(&adj, directed, order, Strategy::Iterative, detect_cycles);
            assert_eq!(recursive, iterative);

            if let Some(path) = recursive.1 {
                assert!(path.len() >= 2);
                assert_eq!(path.first(), path.last());
            }
        }
    }

    let (events, _) = dfs(&adj, directed, TraversalOrder::PreOrder, Strategy::Iterative, false);
    let mut dfs_nodes: Vec<u8> = events
        .into_iter()
        .filter_map(|e| match e {
            Event::Node(n) => Some(n),
            Event::Edge(..) => None,
        })
        .collect();
    dfs_nodes.sort_unstable();
    assert_eq!(dfs_nodes, bfs_nodes(&adj, directed));
});
