//! User-user collaborative filtering.
//!
//! Candidate items are scored by summing the Jaccard similarities of the
//! nearest neighbours that interacted with them:
//! ```text
//! score(u, i) = sum over v in N_k(u) with i in I(v) of sim(u, v)
//! ```
//! where `N_k(u)` are the `k` users most similar to `u` and `I(v)` is the
//! training item set of `v`. Items `u` has already seen are never scored.
use std::collections::BTreeMap;

use data::UserItems;
use similarity::SimilarityTable;
use {ItemId, Recommender};

/// Hyperparameters describing the collaborative filtering model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    num_neighbors: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters::new()
    }
}

impl Hyperparameters {
    /// Build new hyperparameters.
    pub fn new() -> Self {
        Hyperparameters { num_neighbors: 10 }
    }

    /// Set the maximum number of neighbours consulted per user.
    pub fn num_neighbors(mut self, num_neighbors: usize) -> Self {
        self.num_neighbors = num_neighbors;
        self
    }

    /// Build the model, computing user similarities from `user_items`.
    pub fn build(self, user_items: &UserItems) -> UserKnnModel {
        let similarity = SimilarityTable::jaccard(user_items);

        self.build_with_similarity(user_items, similarity)
    }

    /// Build the model from precomputed similarities.
    pub fn build_with_similarity(
        self,
        user_items: &UserItems,
        similarity: SimilarityTable,
    ) -> UserKnnModel {
        UserKnnModel {
            hyper: self,
            user_items,
            similarity,
        }
    }
}

/// User-user nearest neighbour model.
#[derive(Clone, Debug)]
pub struct UserKnnModel<'a> {
    hyper: Hyperparameters,
    user_items: &'a UserItems,
    similarity: SimilarityTable,
}

impl<'a> UserKnnModel<'a> {
    /// The user similarities backing the model.
    pub fn similarity(&self) -> &SimilarityTable {
        &self.similarity
    }

    /// The model's hyperparameters.
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyper
    }
}

impl<'a> Recommender for UserKnnModel<'a> {
    fn scores(&self, user: &str) -> Vec<(ItemId, f64)> {
        let seen = self.user_items.get(user);
        let mut scores: BTreeMap<&str, f64> = BTreeMap::new();

        for (neighbor, weight) in self.similarity.nearest(user, self.hyper.num_neighbors) {
            let items = match self.user_items.get(neighbor) {
                Some(items) => items,
                None => continue,
            };

            for item in items {
                if seen.map_or(false, |seen| seen.contains(item)) {
                    continue;
                }

                *scores.entry(item.as_str()).or_insert(0.0) += weight;
            }
        }

        scores
            .into_iter()
            .map(|(item, score)| (item.to_owned(), score))
            .collect()
    }
}
