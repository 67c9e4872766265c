#[macro_use]
extern crate criterion;

extern crate graphrec;
extern crate rand;

use criterion::Criterion;
use rand::rngs::StdRng;
use rand::SeedableRng;

use graphrec::data::Interactions;
use graphrec::datasets::synthetic;
use graphrec::evaluation::evaluate;
use graphrec::graph::BipartiteGraph;
use graphrec::models::{cf, ppr};
use graphrec::similarity::SimilarityTable;
use graphrec::Recommender;

fn load_synthetic() -> Interactions {
    let mut rng = StdRng::seed_from_u64(42);
    synthetic(500, 1000, 20, &mut rng)
}

fn bench_similarity(c: &mut Criterion) {
    let (train, _) = load_synthetic().leave_last_out_split();
    let train = train.user_items();

    c.bench_function("jaccard", |b| b.iter(|| SimilarityTable::jaccard(&train)));
}

fn bench_cf(c: &mut Criterion) {
    let (train, test) = load_synthetic().leave_last_out_split();
    let train = train.user_items();
    let test = test.user_items();
    let model = cf::Hyperparameters::new().num_neighbors(10).build(&train);

    c.bench_function("cf_evaluate", |b| b.iter(|| evaluate(&model, &train, &test, 10)));
}

fn bench_ppr(c: &mut Criterion) {
    let (train, _) = load_synthetic().leave_last_out_split();
    let graph = BipartiteGraph::from(&train);
    let model = ppr::Hyperparameters::new().build(&graph);

    c.bench_function("ppr_query", |b| b.iter(|| model.recommend("u0000", 10)));
}

criterion_group!{
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_similarity, bench_cf, bench_ppr
}
criterion_main!(benches);
