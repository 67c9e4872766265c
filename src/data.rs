//! Interaction logs, the per-user item index and the leave-last-out split.
use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use super::{ItemId, Timestamp, UserId};

/// A single timestamped user-item interaction.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Interaction {
    user_id: UserId,
    item_id: ItemId,
    timestamp: Timestamp,
}

impl Interaction {
    /// Build a new interaction.
    pub fn new<U: Into<UserId>, I: Into<ItemId>>(
        user_id: U,
        item_id: I,
        timestamp: Timestamp,
    ) -> Self {
        Interaction {
            user_id: user_id.into(),
            item_id: item_id.into(),
            timestamp,
        }
    }

    /// The interacting user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The item interacted with.
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// When the interaction happened.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

fn cmp_timestamp(x: &Interaction, y: &Interaction) -> Ordering {
    let uid_comparison = x.user_id.cmp(&y.user_id);

    if uid_comparison == Ordering::Equal {
        x.timestamp.cmp(&y.timestamp)
    } else {
        uid_comparison
    }
}

/// An immutable log of interactions.
///
/// Repeated (user, item) pairs are kept: they matter for splitting,
/// and collapse naturally once turned into a [`UserItems`] index or a graph.
#[derive(Clone, Debug, Default)]
pub struct Interactions {
    interactions: Vec<Interaction>,
}

impl Interactions {
    /// Build an empty interaction log.
    pub fn new() -> Self {
        Interactions {
            interactions: Vec::new(),
        }
    }

    /// The raw interactions, in ingestion order.
    pub fn data(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of interactions.
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the log holds no interactions.
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Distinct users.
    pub fn users(&self) -> BTreeSet<&str> {
        self.interactions.iter().map(|x| x.user_id()).collect()
    }

    /// Distinct items.
    pub fn items(&self) -> BTreeSet<&str> {
        self.interactions.iter().map(|x| x.item_id()).collect()
    }

    /// Group items by user.
    pub fn user_items(&self) -> UserItems {
        UserItems::from(self)
    }

    /// Copy of the log sorted by user, then by timestamp.
    ///
    /// The sort is stable: interactions of one user sharing a timestamp
    /// keep their ingestion order.
    pub fn sorted_by_user_time(&self) -> Interactions {
        let mut data = self.interactions.clone();
        data.sort_by(cmp_timestamp);

        Interactions::from(data)
    }

    /// Hold out the chronologically last interaction of every user.
    ///
    /// Returns `(train, test)`. The test set holds exactly one interaction
    /// per user; users with a single interaction contribute nothing to
    /// train. Timestamp ties within a user go to whichever interaction
    /// was ingested last.
    pub fn leave_last_out_split(&self) -> (Interactions, Interactions) {
        let sorted = self.sorted_by_user_time();

        let mut train = Vec::with_capacity(sorted.len());
        let mut test = Vec::new();

        let by_user = sorted.interactions.into_iter().group_by(|x| x.user_id.clone());

        for (_, group) in &by_user {
            let mut group: Vec<Interaction> = group.collect();

            if let Some(last) = group.pop() {
                test.push(last);
            }

            train.extend(group);
        }

        debug!(train = train.len(), test = test.len(), "leave-last-out split");

        (Interactions::from(train), Interactions::from(test))
    }
}

impl From<Vec<Interaction>> for Interactions {
    fn from(data: Vec<Interaction>) -> Interactions {
        Interactions { interactions: data }
    }
}

/// Mapping from user to the set of items they interacted with.
///
/// Users and their items iterate in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserItems {
    index: BTreeMap<UserId, BTreeSet<ItemId>>,
}

impl UserItems {
    /// Items of `user`, if the user is present.
    pub fn get(&self, user: &str) -> Option<&BTreeSet<ItemId>> {
        self.index.get(user)
    }

    /// Whether `user` is present.
    pub fn contains(&self, user: &str) -> bool {
        self.index.contains_key(user)
    }

    /// Present users, in identifier order.
    pub fn users(&self) -> btree_map::Keys<UserId, BTreeSet<ItemId>> {
        self.index.keys()
    }

    /// Iterate over `(user, items)` pairs.
    pub fn iter(&self) -> btree_map::Iter<UserId, BTreeSet<ItemId>> {
        self.index.iter()
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no user is present.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<'a> From<&'a Interactions> for UserItems {
    fn from(interactions: &'a Interactions) -> Self {
        let mut index: BTreeMap<UserId, BTreeSet<ItemId>> = BTreeMap::new();

        for datum in interactions.data() {
            index
                .entry(datum.user_id.clone())
                .or_insert_with(BTreeSet::new)
                .insert(datum.item_id.clone());
        }

        UserItems { index }
    }
}
