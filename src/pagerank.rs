//! Personalized PageRank by power iteration.
//!
//! Every undirected edge is walked in both directions with probability
//! `1 / degree`. With probability `1 - damping` the walk restarts at the
//! source node; walkers stranded on isolated nodes restart there as well.
//! The starting vector is uniform and iteration stops once the L1 change
//! between iterates drops below `node_count * tolerance`.
use graph::{Graph, NodeIndex};

/// PageRank configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Probability of following an edge rather than restarting.
    pub damping: f64,
    /// Maximum number of power iterations.
    pub max_iterations: usize,
    /// Per-node convergence tolerance.
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        PageRankConfig {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Stationary distribution of a random walk restarting at `source`.
///
/// Returns one score per node, indexed by [`NodeIndex`], summing to one.
/// An empty graph or an out-of-range source yields an empty vector. If
/// the iteration cap is hit first, the last iterate is returned.
pub fn personalized_pagerank<G: Graph>(
    graph: &G,
    source: NodeIndex,
    config: &PageRankConfig,
) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 || source >= n {
        return Vec::new();
    }

    let degrees: Vec<usize> = (0..n).map(|node| graph.degree(node)).collect();
    let mut scores = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];

    for iteration in 0..config.max_iterations {
        let dangling: f64 = degrees
            .iter()
            .zip(scores.iter())
            .filter(|&(&degree, _)| degree == 0)
            .map(|(_, &score)| score)
            .sum();

        for value in next.iter_mut() {
            *value = 0.0;
        }

        for node in 0..n {
            if degrees[node] == 0 {
                continue;
            }

            let share = config.damping * scores[node] / degrees[node] as f64;
            for &neighbor in graph.neighbors(node) {
                next[neighbor] += share;
            }
        }

        next[source] += config.damping * dangling + (1.0 - config.damping);

        let change: f64 = scores
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        ::std::mem::swap(&mut scores, &mut next);

        if change < n as f64 * config.tolerance {
            trace!(iterations = iteration + 1, change, "pagerank converged");
            return scores;
        }
    }

    warn!(
        max_iterations = config.max_iterations,
        source = graph.node_id(source),
        "pagerank stopped before converging"
    );

    scores
}
