//! Hold-out evaluation with Precision@K and Recall@K.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use data::UserItems;
use graph::BipartiteGraph;
use models::{cf, ppr};
use {ItemId, Recommender};

/// Evaluation error types.
#[derive(Debug, Fail, PartialEq)]
pub enum EvaluationError {
    /// The strategy name is not one of `cf` or `ppr`.
    #[fail(display = "Unknown strategy `{}`: expected `cf` or `ppr`.", _0)]
    UnknownStrategy(String),
    /// Personalized PageRank needs a training graph.
    #[fail(display = "A bipartite training graph is required for the ppr strategy.")]
    MissingGraph,
}

/// Recommendation strategies that can be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// User-user Jaccard collaborative filtering (`cf`).
    CollaborativeFiltering,
    /// Personalized PageRank on the bipartite graph (`ppr`).
    PersonalizedPageRank,
}

impl Strategy {
    /// Short name of the strategy.
    pub fn name(&self) -> &'static str {
        match *self {
            Strategy::CollaborativeFiltering => "cf",
            Strategy::PersonalizedPageRank => "ppr",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = EvaluationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "cf" => Ok(Strategy::CollaborativeFiltering),
            "ppr" => Ok(Strategy::PersonalizedPageRank),
            other => Err(EvaluationError::UnknownStrategy(other.to_owned())),
        }
    }
}

/// Macro-averaged ranking metrics over the evaluated users.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Mean Precision@K.
    pub precision: f64,
    /// Mean Recall@K.
    pub recall: f64,
    /// Number of users evaluated.
    pub num_users: usize,
}

/// Precision and recall of the first `k` recommendations against `truth`.
///
/// Precision divides by the number of recommendations actually
/// considered, which is less than `k` when fewer were returned. Both
/// denominators are floored at one, so empty inputs score zero.
pub fn precision_recall_at_k(recs: &[ItemId], truth: &BTreeSet<ItemId>, k: usize) -> (f64, f64) {
    let recs = &recs[..k.min(recs.len())];
    let hits = recs
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|item| truth.contains(*item))
        .count();

    let precision = hits as f64 / recs.len().max(1) as f64;
    let recall = hits as f64 / truth.len().max(1) as f64;

    (precision, recall)
}

/// Evaluate `model` on every user present in `train` with a non-empty
/// test set, asking for `k` recommendations each.
///
/// Users are scored in parallel; the model is only read.
pub fn evaluate<T: Recommender + Sync>(
    model: &T,
    train: &UserItems,
    test: &UserItems,
    k: usize,
) -> EvaluationResult {
    let users: Vec<(&str, &BTreeSet<ItemId>)> = train
        .users()
        .filter_map(|user| {
            test.get(user)
                .filter(|truth| !truth.is_empty())
                .map(|truth| (user.as_str(), truth))
        })
        .collect();

    let metrics: Vec<(f64, f64)> = users
        .par_iter()
        .map(|&(user, truth)| {
            let recs = model.recommend(user, k);
            precision_recall_at_k(&recs, truth, k)
        })
        .collect();

    if metrics.is_empty() {
        return EvaluationResult::default();
    }

    let num_users = metrics.len();
    let precision = metrics.iter().map(|x| x.0).sum::<f64>() / num_users as f64;
    let recall = metrics.iter().map(|x| x.1).sum::<f64>() / num_users as f64;

    EvaluationResult {
        precision,
        recall,
        num_users,
    }
}

/// Build the model for `strategy` from the training structures and
/// evaluate it.
///
/// Collaborative filtering consults up to `num_neighbors` neighbours;
/// personalized PageRank runs with default settings on `graph`, which
/// must be given.
pub fn evaluate_strategy(
    strategy: Strategy,
    train: &UserItems,
    test: &UserItems,
    graph: Option<&BipartiteGraph>,
    num_neighbors: usize,
    k: usize,
) -> Result<EvaluationResult, EvaluationError> {
    let result = match strategy {
        Strategy::CollaborativeFiltering => {
            let model = cf::Hyperparameters::new().num_neighbors(num_neighbors).build(train);
            evaluate(&model, train, test, k)
        }
        Strategy::PersonalizedPageRank => {
            let graph = graph.ok_or(EvaluationError::MissingGraph)?;
            let model = ppr::Hyperparameters::new().build(graph);
            evaluate(&model, train, test, k)
        }
    };

    info!(
        strategy = strategy.name(),
        users = result.num_users,
        precision = result.precision,
        recall = result.recall,
        "evaluated"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use super::Strategy;
    use data::Interactions;
    use datasets::read_interactions;

    fn set(items: &[&str]) -> BTreeSet<ItemId> {
        items.iter().map(|x| x.to_string()).collect()
    }

    fn list(items: &[&str]) -> Vec<ItemId> {
        items.iter().map(|x| x.to_string()).collect()
    }

    fn toy() -> Interactions {
        read_interactions(
            "user,item,timestamp\n\
             u1,i1,2024-01-01\nu1,i2,2024-01-02\nu1,i3,2024-01-03\n\
             u2,i1,2024-01-01\nu2,i2,2024-01-02\n\
             u3,i3,2024-01-01\nu3,i4,2024-01-02\n\
             solo,i1,2024-01-05\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn parses_strategies() {
        assert_eq!("cf".parse::<Strategy>(), Ok(Strategy::CollaborativeFiltering));
        assert_eq!("ppr".parse::<Strategy>(), Ok(Strategy::PersonalizedPageRank));
        assert_eq!(
            "mf".parse::<Strategy>(),
            Err(EvaluationError::UnknownStrategy("mf".to_owned()))
        );
        assert_eq!(Strategy::PersonalizedPageRank.to_string(), "ppr");
    }

    #[test]
    fn precision_and_recall() {
        let truth = set(&["a", "b"]);

        assert_eq!(precision_recall_at_k(&list(&["a", "x", "y", "z"]), &truth, 10), (0.25, 0.5));
        assert_eq!(precision_recall_at_k(&list(&["a", "b"]), &truth, 10), (1.0, 1.0));
        assert_eq!(precision_recall_at_k(&list(&["x", "y"]), &truth, 10), (0.0, 0.0));
        assert_eq!(precision_recall_at_k(&[], &truth, 10), (0.0, 0.0));
        assert_eq!(precision_recall_at_k(&list(&["a"]), &BTreeSet::new(), 10), (0.0, 0.0));
    }

    #[test]
    fn precision_uses_returned_length_when_short() {
        let truth = set(&["a"]);

        // One hit out of one returned item, even though k is ten.
        assert_eq!(precision_recall_at_k(&list(&["a"]), &truth, 10), (1.0, 1.0));
        // Only the first k recommendations count.
        assert_eq!(precision_recall_at_k(&list(&["x", "a"]), &truth, 1), (0.0, 0.0));
    }

    #[test]
    fn toy_scenario() {
        let (train, test) = toy().leave_last_out_split();
        let train = train.user_items();
        let test = test.user_items();

        let result =
            evaluate_strategy(Strategy::CollaborativeFiltering, &train, &test, None, 10, 10)
                .unwrap();

        // `solo` only has a test interaction and is skipped.
        assert_eq!(result.num_users, 3);
        assert!(result.precision >= 0.0 && result.precision <= 1.0);
        assert!(result.recall >= 0.0 && result.recall <= 1.0);

        let model = cf::Hyperparameters::new().build(&train);
        let truth = test.get("u1").unwrap();
        assert_eq!(
            precision_recall_at_k(&model.recommend("u1", 10), truth, 10),
            (0.0, 0.0)
        );
    }

    #[test]
    fn isolated_user_is_excluded() {
        let (train_log, test_log) = toy().leave_last_out_split();
        let train = train_log.user_items();
        let test = test_log.user_items();
        let graph = BipartiteGraph::from(&train_log);

        let cf_model = cf::Hyperparameters::new().build(&train);
        let ppr_model = ppr::Hyperparameters::new().build(&graph);
        assert!(cf_model.recommend("solo", 10).is_empty());
        assert!(ppr_model.recommend("solo", 10).is_empty());

        let result = evaluate_strategy(
            Strategy::PersonalizedPageRank,
            &train,
            &test,
            Some(&graph),
            10,
            10,
        )
        .unwrap();
        assert_eq!(result.num_users, 3);
    }

    #[test]
    fn ppr_requires_a_graph() {
        let (train, test) = toy().leave_last_out_split();

        assert_eq!(
            evaluate_strategy(
                Strategy::PersonalizedPageRank,
                &train.user_items(),
                &test.user_items(),
                None,
                10,
                10
            ),
            Err(EvaluationError::MissingGraph)
        );
    }

    #[test]
    fn nothing_to_evaluate() {
        let empty = UserItems::default();
        let model = cf::Hyperparameters::new().build(&empty);

        assert_eq!(evaluate(&model, &empty, &empty, 10), EvaluationResult::default());
    }

    proptest! {
        #[test]
        fn metrics_are_bounded(
            recs in prop::collection::vec(0..20u8, 0..15),
            truth in prop::collection::btree_set(0..20u8, 0..10),
            k in 0..15usize
        ) {
            let recs: Vec<ItemId> = recs.iter().map(|x| x.to_string()).collect();
            let truth: BTreeSet<ItemId> = truth.iter().map(|x| x.to_string()).collect();

            let (precision, recall) = precision_recall_at_k(&recs, &truth, k);

            prop_assert!(precision >= 0.0 && precision <= 1.0);
            prop_assert!(recall >= 0.0 && recall <= 1.0);

            if recs.iter().take(k).all(|x| !truth.contains(x)) {
                prop_assert_eq!((precision, recall), (0.0, 0.0));
            }
        }
    }
}
