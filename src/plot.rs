//! Graphviz rendering of a user's neighbourhood, for inspection only.
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use failure;
use petgraph::dot::{Config, Dot};
use petgraph::graph::UnGraph;

use graph::{BipartiteGraph, Graph, Partition};

/// Items of the user to include.
pub const MAX_ITEMS: usize = 12;
/// Neighbours to include per included item.
pub const MAX_PER_ITEM: usize = 6;

struct Label {
    id: String,
    partition: Partition,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Render the ego graph around `user` in DOT format. Users are drawn
/// as boxes, items as ellipses.
///
/// Returns `None` if the user is not in the graph.
pub fn ego_dot(graph: &BipartiteGraph, user: &str) -> Option<String> {
    let ego = graph.ego_graph(user, MAX_ITEMS, MAX_PER_ITEM)?;

    let mut rendered: UnGraph<Label, &str> =
        UnGraph::with_capacity(ego.node_count(), ego.edge_count());
    let indices: Vec<_> = (0..ego.node_count())
        .map(|node| {
            rendered.add_node(Label {
                id: ego.node_id(node).to_owned(),
                partition: ego.partition(node),
            })
        })
        .collect();

    for node in 0..ego.node_count() {
        for &neighbor in ego.neighbors(node) {
            if node < neighbor {
                rendered.add_edge(indices[node], indices[neighbor], "");
            }
        }
    }

    Some(format!(
        "{}",
        Dot::with_attr_getters(
            &rendered,
            &[Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (_, label)| match label.partition {
                Partition::Users => "shape = box".to_owned(),
                Partition::Items => "shape = ellipse".to_owned(),
            },
        )
    ))
}

/// Write the ego graph around `user` to `path` as a DOT file.
///
/// Returns `false`, writing nothing, if the user is not in the graph.
pub fn write_ego_dot<P: AsRef<Path>>(
    graph: &BipartiteGraph,
    user: &str,
    path: P,
) -> Result<bool, failure::Error> {
    let dot = match ego_dot(graph, user) {
        Some(dot) => dot,
        None => {
            warn!(user, "user not in graph, nothing to plot");
            return Ok(false);
        }
    };

    let mut file = File::create(path.as_ref())?;
    file.write_all(dot.as_bytes())?;

    info!(user, path = %path.as_ref().display(), "wrote ego graph");

    Ok(true)
}
