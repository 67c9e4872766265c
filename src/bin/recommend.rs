extern crate clap;
extern crate failure;
extern crate graphrec;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphrec::datasets::load_csv;
use graphrec::evaluation::{evaluate, EvaluationResult, Strategy};
use graphrec::graph::{BipartiteGraph, Graph};
use graphrec::models::{cf, ppr};
use graphrec::plot::write_ego_dot;
use graphrec::similarity::SimilarityTable;
use graphrec::{ItemId, Recommender};

/// Evaluate graph recommenders on an interaction log and show
/// recommendations for one user.
#[derive(Parser, Debug)]
#[command(name = "recommend", version)]
struct Args {
    /// CSV file with `user`, `item` and `timestamp` columns.
    #[arg(long, default_value = "interactions.csv")]
    csv: PathBuf,
    /// User to show example recommendations for.
    #[arg(long, default_value = "u01")]
    user: String,
    /// Top-K recommendations.
    #[arg(long, default_value_t = 10)]
    k: usize,
    /// CF: K nearest users.
    #[arg(long, default_value_t = 10)]
    neighbors: usize,
    /// Write a small ego-graph plot (Graphviz DOT) for the user.
    #[arg(long)]
    plot: bool,
    /// Where to write the plot; defaults to `ego_<user>.dot`.
    #[arg(long)]
    plot_path: Option<PathBuf>,
    /// Also write both evaluation results and recommendations as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Log filter, used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Serialize)]
struct Report {
    k: usize,
    neighbors: usize,
    cf: EvaluationResult,
    ppr: EvaluationResult,
    user: String,
    cf_recommendations: Vec<ItemId>,
    ppr_recommendations: Vec<ItemId>,
}

fn init_logging(level: &str) -> Result<(), failure::Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| failure::err_msg(format!("Logging already initialized: {}", e)))
}

fn log_result(strategy: Strategy, result: &EvaluationResult) {
    info!(
        strategy = strategy.name(),
        users = result.num_users,
        precision = result.precision,
        recall = result.recall,
        "evaluated"
    );
}

fn run(args: Args) -> Result<(), failure::Error> {
    let data = load_csv(&args.csv)?;
    let graph = BipartiteGraph::from(&data);
    debug!(
        users = graph.num_users(),
        items = graph.num_items(),
        edges = graph.edge_count(),
        "full interaction graph"
    );

    let (train, test) = data.leave_last_out_split();
    let train_items = train.user_items();
    let test_items = test.user_items();
    let train_graph = BipartiteGraph::from(&train);

    let similarity = SimilarityTable::jaccard(&train_items);
    let cf_model = cf::Hyperparameters::new()
        .num_neighbors(args.neighbors)
        .build_with_similarity(&train_items, similarity);
    let ppr_model = ppr::Hyperparameters::new().build(&train_graph);

    let cf_result = evaluate(&cf_model, &train_items, &test_items, args.k);
    log_result(Strategy::CollaborativeFiltering, &cf_result);
    println!(
        "[CF] users evaluated={}  Precision@{}={:.3}  Recall@{}={:.3}",
        cf_result.num_users, args.k, cf_result.precision, args.k, cf_result.recall
    );

    let ppr_result = evaluate(&ppr_model, &train_items, &test_items, args.k);
    log_result(Strategy::PersonalizedPageRank, &ppr_result);
    println!(
        "[PPR] users evaluated={} Precision@{}={:.3} Recall@{}={:.3}",
        ppr_result.num_users, args.k, ppr_result.precision, args.k, ppr_result.recall
    );

    let cf_recs = cf_model.recommend(&args.user, args.k);
    let ppr_recs = ppr_model.recommend(&args.user, args.k);

    println!("\nUser {} — CF top{}:  {:?}", args.user, args.k, cf_recs);
    println!("User {} — PPR top{}: {:?}", args.user, args.k, ppr_recs);

    if args.plot {
        let path = args
            .plot_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("ego_{}.dot", args.user)));

        if !write_ego_dot(&train_graph, &args.user, &path)? {
            println!("{} not in graph", args.user);
        }
    }

    if let Some(ref path) = args.report {
        let report = Report {
            k: args.k,
            neighbors: args.neighbors,
            cf: cf_result,
            ppr: ppr_result,
            user: args.user.clone(),
            cf_recommendations: cf_recs,
            ppr_recommendations: ppr_recs,
        };

        serde_json::to_writer_pretty(File::create(path)?, &report)?;
        info!(path = %path.display(), "wrote report");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(error) = init_logging(&args.log_level) {
        eprintln!("error: {}", error);
        process::exit(2);
    }

    if let Err(error) = run(args) {
        error!("{}", error);
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
