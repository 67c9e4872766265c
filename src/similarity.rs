//! User-user Jaccard similarity.
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use data::UserItems;
use {rank, ItemId, UserId};

/// Jaccard similarity of two sets: intersection size over union size.
///
/// Two empty sets have similarity zero.
pub fn jaccard(a: &BTreeSet<ItemId>, b: &BTreeSet<ItemId>) -> f64 {
    let intersection = a.intersection(b).count();

    if intersection == 0 {
        return 0.0;
    }

    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// Sparse, symmetric table of user-user similarities.
///
/// Only pairs sharing at least one item are stored; every stored value
/// lies in `(0, 1]` and users are never paired with themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimilarityTable {
    rows: BTreeMap<UserId, BTreeMap<UserId, f64>>,
    num_pairs: usize,
}

impl SimilarityTable {
    /// Compute Jaccard similarities between all pairs of users.
    ///
    /// Quadratic in the number of users. Pairs are scored in parallel,
    /// each exactly once.
    pub fn jaccard(user_items: &UserItems) -> Self {
        let users: Vec<(&UserId, &BTreeSet<ItemId>)> = user_items.iter().collect();
        let users = &users;

        let pairs: Vec<(usize, usize, f64)> = (0..users.len())
            .into_par_iter()
            .flat_map_iter(move |i| {
                ((i + 1)..users.len()).filter_map(move |j| {
                    let similarity = jaccard(users[i].1, users[j].1);

                    if similarity > 0.0 {
                        Some((i, j, similarity))
                    } else {
                        None
                    }
                })
            })
            .collect();

        let mut table = SimilarityTable::default();

        for &(i, j, similarity) in &pairs {
            table.insert(users[i].0, users[j].0, similarity);
        }

        debug!(users = users.len(), pairs = table.len(), "computed jaccard similarities");

        table
    }

    fn insert(&mut self, u: &str, v: &str, similarity: f64) {
        self.rows
            .entry(u.to_owned())
            .or_insert_with(BTreeMap::new)
            .insert(v.to_owned(), similarity);
        self.rows
            .entry(v.to_owned())
            .or_insert_with(BTreeMap::new)
            .insert(u.to_owned(), similarity);
        self.num_pairs += 1;
    }

    /// Similarity of two users; zero when not stored.
    pub fn get(&self, u: &str, v: &str) -> f64 {
        self.rows
            .get(u)
            .and_then(|row| row.get(v))
            .cloned()
            .unwrap_or(0.0)
    }

    /// All stored neighbours of `user`, in identifier order.
    pub fn neighbors(&self, user: &str) -> Option<&BTreeMap<UserId, f64>> {
        self.rows.get(user)
    }

    /// The `k` most similar users to `user`, most similar first.
    ///
    /// Equal similarities are ordered by user id.
    pub fn nearest(&self, user: &str, k: usize) -> Vec<(&str, f64)> {
        let row = match self.rows.get(user) {
            Some(row) => row,
            None => return Vec::new(),
        };

        rank(row.iter().map(|(v, &s)| (v.as_str(), s)).collect(), k)
    }

    /// Number of stored unordered pairs.
    pub fn len(&self) -> usize {
        self.num_pairs
    }

    /// Whether no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.num_pairs == 0
    }
}
