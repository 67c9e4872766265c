//! Personalized PageRank recommender.
//!
//! Runs a random walk with restart from the target user over the
//! bipartite training graph and recommends the highest-scoring item nodes
//! the user is not already connected to. Relevance diffuses through shared
//! items to like-minded users and on to their other items, so the walk
//! picks up multi-hop similarity that one-hop Jaccard misses, at the cost
//! of a full power iteration per query.
use std::collections::HashSet;

use graph::{BipartiteGraph, Graph, Partition};
use pagerank::{personalized_pagerank, PageRankConfig};
use {ItemId, Recommender};

/// Hyperparameters describing the personalized PageRank model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pagerank: PageRankConfig,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters::new()
    }
}

impl Hyperparameters {
    /// Build new hyperparameters.
    pub fn new() -> Self {
        Hyperparameters {
            pagerank: PageRankConfig::default(),
        }
    }

    /// Set the damping factor: the probability of following an edge
    /// instead of restarting at the user.
    pub fn damping(mut self, damping: f64) -> Self {
        self.pagerank.damping = damping;
        self
    }

    /// Set the maximum number of power iterations.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.pagerank.max_iterations = max_iterations;
        self
    }

    /// Set the per-node convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.pagerank.tolerance = tolerance;
        self
    }

    /// Build the model over a training graph.
    pub fn build(self, graph: &BipartiteGraph) -> PersonalizedPageRankModel {
        PersonalizedPageRankModel { hyper: self, graph }
    }
}

/// Personalized PageRank model.
#[derive(Clone, Debug)]
pub struct PersonalizedPageRankModel<'a> {
    hyper: Hyperparameters,
    graph: &'a BipartiteGraph,
}

impl<'a> PersonalizedPageRankModel<'a> {
    /// The graph the walk runs on.
    pub fn graph(&self) -> &BipartiteGraph {
        self.graph
    }

    /// The model's hyperparameters.
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyper
    }
}

impl<'a> Recommender for PersonalizedPageRankModel<'a> {
    fn scores(&self, user: &str) -> Vec<(ItemId, f64)> {
        let source = match self.graph.user_index(user) {
            Some(source) => source,
            None => return Vec::new(),
        };

        let ranks = personalized_pagerank(self.graph, source, &self.hyper.pagerank);
        let seen: HashSet<_> = self.graph.neighbors(source).iter().cloned().collect();

        ranks
            .into_iter()
            .enumerate()
            .filter(|&(node, _)| {
                self.graph.partition(node) == Partition::Items && !seen.contains(&node)
            })
            .map(|(node, score)| (self.graph.node_id(node).to_owned(), score))
            .collect()
    }
}
