//! The bipartite user-item interaction graph.
//!
//! Nodes live in one of two partitions, [`Partition::Users`] or
//! [`Partition::Items`]; identifiers are namespaced by partition, so a user
//! and an item may share a name without being the same node. Edges only
//! ever join a user to an item and carry the latest timestamp observed for
//! that pair, whatever order the interactions arrive in.
use std::collections::HashMap;
use std::fmt;

use data::{Interaction, Interactions};
use Timestamp;

/// Index of a node inside a graph.
pub type NodeIndex = usize;

/// The partition a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    /// User nodes.
    Users,
    /// Item nodes.
    Items,
}

impl Partition {
    /// The partition tag, `"users"` or `"items"`.
    pub fn label(&self) -> &'static str {
        match *self {
            Partition::Users => "users",
            Partition::Items => "items",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Graph error types.
#[derive(Debug, Fail)]
pub enum GraphError {
    /// Attempted to join two nodes of the same partition.
    #[fail(display = "Cannot join `{}` and `{}`: both are {}.", a, b, partition)]
    SamePartition {
        /// Identifier of the first node.
        a: String,
        /// Identifier of the second node.
        b: String,
        /// Their shared partition.
        partition: Partition,
    },
}

/// Capabilities the recommenders need from an undirected, partition-tagged graph.
pub trait Graph {
    /// Add a node, returning its index. Adding an existing
    /// `(id, partition)` pair returns the existing index.
    fn add_node(&mut self, id: &str, partition: Partition) -> NodeIndex;
    /// Add an undirected edge, or update the timestamp of an existing one.
    /// Returns whether the edge is new.
    fn add_edge(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        timestamp: Timestamp,
    ) -> Result<bool, GraphError>;
    /// Look up a node.
    fn node_index(&self, id: &str, partition: Partition) -> Option<NodeIndex>;
    /// Identifier of a node.
    fn node_id(&self, node: NodeIndex) -> &str;
    /// Partition of a node.
    fn partition(&self, node: NodeIndex) -> Partition;
    /// Neighbours of a node, in edge insertion order.
    fn neighbors(&self, node: NodeIndex) -> &[NodeIndex];
    /// Timestamp attribute of an edge, if the edge exists.
    fn edge_timestamp(&self, a: NodeIndex, b: NodeIndex) -> Option<Timestamp>;
    /// Number of nodes.
    fn node_count(&self) -> usize;
    /// Number of edges.
    fn edge_count(&self) -> usize;

    /// Number of neighbours of a node.
    fn degree(&self, node: NodeIndex) -> usize {
        self.neighbors(node).len()
    }
}

#[derive(Clone, Debug)]
struct Node {
    id: String,
    partition: Partition,
}

fn edge_key(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Adjacency-list implementation of [`Graph`].
#[derive(Clone, Debug, Default)]
pub struct BipartiteGraph {
    nodes: Vec<Node>,
    users: HashMap<String, NodeIndex>,
    items: HashMap<String, NodeIndex>,
    adjacency: Vec<Vec<NodeIndex>>,
    edges: HashMap<(NodeIndex, NodeIndex), Timestamp>,
}

impl BipartiteGraph {
    /// Build an empty graph.
    pub fn new() -> Self {
        BipartiteGraph::default()
    }

    /// Index of a user node.
    pub fn user_index(&self, user: &str) -> Option<NodeIndex> {
        self.users.get(user).cloned()
    }

    /// Index of an item node.
    pub fn item_index(&self, item: &str) -> Option<NodeIndex> {
        self.items.get(item).cloned()
    }

    /// Number of user nodes.
    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    /// Number of item nodes.
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Record an interaction, creating its nodes if needed. Returns whether
    /// the user-item edge is new.
    pub fn add_interaction(&mut self, interaction: &Interaction) -> bool {
        let user = self.add_node(interaction.user_id(), Partition::Users);
        let item = self.add_node(interaction.item_id(), Partition::Items);

        self.insert_edge(user, item, interaction.timestamp())
    }

    /// Insert or refresh the edge between `a` and `b`, which must lie in
    /// different partitions.
    fn insert_edge(&mut self, a: NodeIndex, b: NodeIndex, timestamp: Timestamp) -> bool {
        let key = edge_key(a, b);

        if let Some(existing) = self.edges.get_mut(&key) {
            if timestamp > *existing {
                *existing = timestamp;
            }
            return false;
        }

        self.edges.insert(key, timestamp);
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);

        true
    }

    /// The neighbourhood of `user`: the user, their first `max_items`
    /// items, and the first `max_per_item` neighbours of each of those
    /// items, with every edge among them.
    ///
    /// Returns `None` if the user is not in the graph.
    pub fn ego_graph(
        &self,
        user: &str,
        max_items: usize,
        max_per_item: usize,
    ) -> Option<BipartiteGraph> {
        let center = self.user_index(user)?;

        let mut members = vec![center];
        for &item in self.neighbors(center).iter().take(max_items) {
            members.push(item);
            members.extend(self.neighbors(item).iter().take(max_per_item));
        }

        let mut ego = BipartiteGraph::new();
        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for &node in &members {
            if !mapping.contains_key(&node) {
                let inner = ego.add_node(self.node_id(node), self.partition(node));
                mapping.insert(node, inner);
            }
        }

        for &node in &members {
            for &neighbor in self.neighbors(node) {
                if let (Some(&a), Some(&b)) = (mapping.get(&node), mapping.get(&neighbor)) {
                    if let Some(timestamp) = self.edge_timestamp(node, neighbor) {
                        ego.insert_edge(a, b, timestamp);
                    }
                }
            }
        }

        Some(ego)
    }
}

impl Graph for BipartiteGraph {
    fn add_node(&mut self, id: &str, partition: Partition) -> NodeIndex {
        if let Some(existing) = self.node_index(id, partition) {
            return existing;
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            id: id.to_owned(),
            partition,
        });
        self.adjacency.push(Vec::new());

        match partition {
            Partition::Users => self.users.insert(id.to_owned(), index),
            Partition::Items => self.items.insert(id.to_owned(), index),
        };

        index
    }

    fn add_edge(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        timestamp: Timestamp,
    ) -> Result<bool, GraphError> {
        let partition = self.partition(a);

        if partition == self.partition(b) {
            return Err(GraphError::SamePartition {
                a: self.node_id(a).to_owned(),
                b: self.node_id(b).to_owned(),
                partition,
            });
        }

        Ok(self.insert_edge(a, b, timestamp))
    }

    fn node_index(&self, id: &str, partition: Partition) -> Option<NodeIndex> {
        match partition {
            Partition::Users => self.user_index(id),
            Partition::Items => self.item_index(id),
        }
    }

    fn node_id(&self, node: NodeIndex) -> &str {
        &self.nodes[node].id
    }

    fn partition(&self, node: NodeIndex) -> Partition {
        self.nodes[node].partition
    }

    fn neighbors(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.adjacency[node]
    }

    fn edge_timestamp(&self, a: NodeIndex, b: NodeIndex) -> Option<Timestamp> {
        self.edges.get(&edge_key(a, b)).cloned()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl<'a> From<&'a Interactions> for BipartiteGraph {
    fn from(interactions: &'a Interactions) -> Self {
        let mut graph = BipartiteGraph::new();

        for user in interactions.users() {
            graph.add_node(user, Partition::Users);
        }
        for item in interactions.items() {
            graph.add_node(item, Partition::Items);
        }
        for interaction in interactions.data() {
            graph.add_interaction(interaction);
        }

        debug!(
            users = graph.num_users(),
            items = graph.num_items(),
            edges = graph.edge_count(),
            "built bipartite graph"
        );

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasets::{parse_timestamp, read_interactions};

    fn at(secs: i64) -> Timestamp {
        parse_timestamp(&secs.to_string()).unwrap()
    }

    fn toy() -> BipartiteGraph {
        let csv = "user,item,timestamp\n\
                   u1,i1,1\nu1,i2,2\nu1,i3,3\n\
                   u2,i1,1\nu2,i2,2\n\
                   u3,i3,1\nu3,i4,2\n";

        BipartiteGraph::from(&read_interactions(csv.as_bytes()).unwrap())
    }

    #[test]
    fn every_edge_joins_a_user_and_an_item() {
        let graph = toy();

        assert_eq!(graph.num_users(), 3);
        assert_eq!(graph.num_items(), 4);
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 7);

        for node in 0..graph.node_count() {
            for &neighbor in graph.neighbors(node) {
                assert_ne!(graph.partition(node), graph.partition(neighbor));
            }
        }
    }

    #[test]
    fn rejects_same_partition_edges() {
        let mut graph = toy();
        let u1 = graph.user_index("u1").unwrap();
        let u2 = graph.user_index("u2").unwrap();

        assert!(graph.add_edge(u1, u2, at(0)).is_err());
        assert_eq!(graph.degree(u1), 3);
    }

    #[test]
    fn users_and_items_are_namespaced() {
        let mut graph = BipartiteGraph::new();
        let user = graph.add_node("x", Partition::Users);
        let item = graph.add_node("x", Partition::Items);

        assert_ne!(user, item);
        assert_eq!(graph.add_node("x", Partition::Users), user);
        assert!(graph.add_edge(user, item, at(0)).unwrap());
    }

    #[test]
    fn edge_keeps_latest_timestamp_regardless_of_order() {
        let later_first = Interactions::from(vec![
            Interaction::new("u1", "i1", at(10)),
            Interaction::new("u1", "i1", at(5)),
        ]);
        let earlier_first = Interactions::from(vec![
            Interaction::new("u1", "i1", at(5)),
            Interaction::new("u1", "i1", at(10)),
        ]);

        for interactions in &[later_first, earlier_first] {
            let graph = BipartiteGraph::from(interactions);
            let user = graph.user_index("u1").unwrap();
            let item = graph.item_index("i1").unwrap();

            assert_eq!(graph.edge_count(), 1);
            assert_eq!(graph.degree(user), 1);
            assert_eq!(graph.edge_timestamp(user, item), Some(at(10)));
            assert_eq!(graph.edge_timestamp(item, user), Some(at(10)));
        }
    }

    #[test]
    fn add_interaction_reports_new_edges() {
        let mut graph = BipartiteGraph::new();

        assert!(graph.add_interaction(&Interaction::new("u1", "i1", at(5))));
        assert!(!graph.add_interaction(&Interaction::new("u1", "i1", at(10))));
        assert!(!graph.add_interaction(&Interaction::new("u1", "i1", at(1))));
        assert!(graph.add_interaction(&Interaction::new("u1", "i2", at(1))));

        let user = graph.user_index("u1").unwrap();
        let item = graph.item_index("i1").unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(user), 2);
        assert_eq!(graph.edge_timestamp(user, item), Some(at(10)));
    }

    #[test]
    fn ego_graph_is_bounded_neighbourhood() {
        let graph = toy();

        let ego = graph.ego_graph("u2", 12, 6).unwrap();

        // u2, its items i1 and i2, and u1 reached through them.
        assert_eq!(ego.num_users(), 2);
        assert_eq!(ego.num_items(), 2);
        assert_eq!(ego.edge_count(), 4);
        assert!(ego.user_index("u3").is_none());

        let tiny = graph.ego_graph("u1", 1, 1).unwrap();
        assert_eq!(tiny.node_count(), 2);

        assert!(graph.ego_graph("nobody", 12, 6).is_none());
    }
}
