#![deny(missing_docs)]
//! # graphrec
//!
//! `graphrec` recommends items to users from a log of timestamped
//! interactions using two graph-based strategies:
//!
//! - user-user collaborative filtering weighted by Jaccard similarity
//!   of the users' item sets, and
//! - personalized PageRank over the bipartite user-item graph.
//!
//! Both are evaluated by holding out every user's last interaction and
//! measuring Precision@K and Recall@K on the held-out items.
//!
//! ## Example
//! ```rust
//! # extern crate graphrec;
//! let csv = "user,item,timestamp\n\
//!            u1,i1,2024-01-01\nu1,i2,2024-01-02\nu1,i3,2024-01-03\n\
//!            u2,i1,2024-01-01\nu2,i2,2024-01-02\nu2,i4,2024-01-03\n\
//!            u3,i2,2024-01-01\nu3,i3,2024-01-02\n";
//! let data = graphrec::datasets::read_interactions(csv.as_bytes()).unwrap();
//!
//! let (train, test) = data.leave_last_out_split();
//! let train_items = train.user_items();
//! let test_items = test.user_items();
//!
//! let cf_model = graphrec::models::cf::Hyperparameters::new()
//!     .num_neighbors(10)
//!     .build(&train_items);
//! let cf_result = graphrec::evaluation::evaluate(&cf_model, &train_items, &test_items, 10);
//!
//! let graph = graphrec::graph::BipartiteGraph::from(&train);
//! let ppr_model = graphrec::models::ppr::Hyperparameters::new().build(&graph);
//! let ppr_result = graphrec::evaluation::evaluate(&ppr_model, &train_items, &test_items, 10);
//!
//! println!("CF {:?}, PPR {:?}", cf_result, ppr_result);
//! println!(
//!     "u3 -> {:?}",
//!     graphrec::Recommender::recommend(&ppr_model, "u3", 2)
//! );
//! ```
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate tracing;

extern crate chrono;
extern crate csv;
extern crate itertools;
extern crate petgraph;
extern crate rand;
extern crate rayon;
extern crate serde;

#[cfg(test)]
#[macro_use]
extern crate proptest;

pub mod data;
pub mod datasets;
pub mod evaluation;
pub mod graph;
pub mod models;
pub mod pagerank;
pub mod plot;
pub mod similarity;

use std::cmp::Ordering;

/// Alias for user identifiers.
pub type UserId = String;
/// Alias for item identifiers.
pub type ItemId = String;
/// Alias for timestamps.
pub type Timestamp = chrono::NaiveDateTime;

/// Trait describing models that can score and rank unseen items
/// for a given user.
pub trait Recommender {
    /// Score every candidate item for `user`. Items the user has already
    /// interacted with are never candidates. Unknown users get no scores.
    fn scores(&self, user: &str) -> Vec<(ItemId, f64)>;

    /// Return at most `num_items` item ids, highest score first.
    ///
    /// Equal scores are ordered by item id.
    fn recommend(&self, user: &str, num_items: usize) -> Vec<ItemId> {
        rank(self.scores(user), num_items)
            .into_iter()
            .map(|(item_id, _)| item_id)
            .collect()
    }
}

/// Sort scored identifiers by descending score, breaking ties on the
/// identifier, and keep the first `num_items`.
pub fn rank<T: Ord>(mut scored: Vec<(T, f64)>, num_items: usize) -> Vec<(T, f64)> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(num_items);

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_by_score_then_id() {
        let scored = vec![
            ("b".to_owned(), 0.5),
            ("a".to_owned(), 0.5),
            ("c".to_owned(), 0.9),
            ("d".to_owned(), 0.1),
        ];

        let ranked: Vec<_> = rank(scored, 3).into_iter().map(|(id, _)| id).collect();

        assert_eq!(ranked, vec!["c", "a", "b"]);
    }

    #[test]
    fn rank_caps_output() {
        let scored: Vec<_> = (0..10).map(|x| (x, x as f64)).collect();

        assert_eq!(rank(scored.clone(), 0).len(), 0);
        assert_eq!(rank(scored.clone(), 4).len(), 4);
        assert_eq!(rank(scored, 100).len(), 10);
    }
}
