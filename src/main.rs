use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use loanfit_data::{
    ExperimentName, FeatureRow, LoanReader, LoanTable, MetricRow, ModelMetrics, OneHotEncoder,
    ResultWriter, SplitData, SplitSummary, TrainTestSplit,
};
use loanfit_plot::{ChartConfig, render_loan_charts};
use loanfit_rf::{
    ClassMetrics, DecisionTreeConfig, Evaluation, MaxFeatures, RandomForestConfig, RankedFeature,
    SplitCriterion, Voting, evaluate_holdout, rank_features,
};

#[derive(Parser)]
#[command(name = "loanfit")]
#[command(about = "Loan repayment classification with decision trees and random forests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the split and both models (drawn and logged if not set)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Exploration output options.
#[derive(Args, Debug, Clone)]
struct ExploreArgs {
    /// Histogram bin count
    #[arg(long, default_value_t = 30)]
    bins: usize,

    /// Rows to print from the top of the table
    #[arg(long, default_value_t = 5)]
    head: usize,
}

/// Encoding, split, and model parameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Label column
    #[arg(long, default_value = "not.fully.paid")]
    target: String,

    /// Categorical column to one-hot encode (repeatable)
    #[arg(long, default_value = "purpose")]
    categorical: Vec<String>,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = 0.3)]
    test_fraction: f64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth for both models (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Split criterion: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,

    /// Forest vote aggregation: "majority" or "soft"
    #[arg(long, default_value = "majority")]
    voting: String,

    /// Features examined per forest split: "sqrt", "log2", "all", a count, or a fraction
    #[arg(long, default_value = "sqrt")]
    max_features: String,

    /// Train every forest tree on the full training set instead of a bootstrap sample
    #[arg(long, default_value_t = false)]
    no_bootstrap: bool,

    /// Experiment name for the JSON artifact (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print table summaries and render exploratory charts
    Explore {
        /// Path to the loan CSV file
        #[arg(long)]
        data: PathBuf,

        /// Directory for the SVG charts
        #[arg(long)]
        output_dir: PathBuf,

        #[command(flatten)]
        explore: ExploreArgs,
    },

    /// Encode, split, then train and evaluate a decision tree and a random forest
    Evaluate {
        /// Path to the loan CSV file
        #[arg(long)]
        data: PathBuf,

        /// Directory for the JSON artifact
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Explore, then evaluate
    Run {
        /// Path to the loan CSV file
        #[arg(long)]
        data: PathBuf,

        /// Directory for the SVG charts and the JSON artifact
        #[arg(long)]
        output_dir: PathBuf,

        #[command(flatten)]
        explore: ExploreArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExploreOutput {
    n_rows: usize,
    charts: Vec<PathBuf>,
}

/// One fitted model's hold-out results, kept for printing and the artifact.
struct ModelRun {
    name: &'static str,
    evaluation: Evaluation,
    ranked: Vec<RankedFeature>,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn parse_voting(s: &str) -> Result<Voting> {
    match s {
        "majority" => Ok(Voting::Majority),
        "soft" => Ok(Voting::Soft),
        other => anyhow::bail!("unknown voting mode: {other} (expected majority or soft)"),
    }
}

fn load(data: &Path) -> Result<LoanTable> {
    let table = LoanReader::new(data)
        .read()
        .with_context(|| format!("failed to read {}", data.display()))?;
    info!(n_rows = table.len(), "dataset loaded");
    Ok(table)
}

fn explore(table: &LoanTable, args: &ExploreArgs, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let frame = table.to_frame();
    println!("{}", frame.info());
    println!("{}", frame.describe());
    println!("{}", frame.head(args.head));

    let config = ChartConfig::new().with_bins(args.bins);
    render_loan_charts(table, &config, output_dir).context("failed to render charts")
}

fn print_run(run: &ModelRun) {
    println!("=== {} ===", run.name);
    println!("{}", run.evaluation.report);
    println!("{}", run.evaluation.confusion);
    println!("feature importances:");
    for feature in &run.ranked {
        println!("{:>4}. {:<30} {:.4}", feature.rank, feature.name, feature.importance);
    }
    println!();
}

fn metric_row(m: &ClassMetrics) -> MetricRow<'_> {
    MetricRow {
        name: &m.name,
        precision: m.precision,
        recall: m.recall,
        f1: m.f1,
        support: m.support,
    }
}

fn model_metrics(run: &ModelRun) -> ModelMetrics<'_> {
    let report = &run.evaluation.report;
    ModelMetrics {
        model: run.name,
        accuracy: run.evaluation.accuracy(),
        classes: report.classes.iter().map(metric_row).collect(),
        macro_avg: metric_row(&report.macro_avg),
        weighted_avg: metric_row(&report.weighted_avg),
        confusion_matrix: run.evaluation.confusion.as_rows(),
        feature_importances: run
            .ranked
            .iter()
            .map(|f| FeatureRow {
                name: &f.name,
                importance: f.importance,
                rank: f.rank,
            })
            .collect(),
    }
}

fn evaluate(
    table: &LoanTable,
    args: &ModelArgs,
    seed: Option<u64>,
    output_dir: &Path,
) -> Result<()> {
    let criterion = parse_criterion(&args.criterion)?;
    let voting = parse_voting(&args.voting)?;
    let max_features: MaxFeatures = args.max_features.parse()?;
    let experiment = args
        .experiment
        .clone()
        .map(ExperimentName::new)
        .transpose()?;

    // 1. Encode categorical columns
    let encoded = OneHotEncoder::new(&args.categorical)
        .encode(&table.to_frame())
        .context("failed to encode categorical columns")?;
    info!(n_cols = encoded.n_cols(), "features encoded");

    // 2. Split
    let mut splitter = TrainTestSplit::new(args.test_fraction)?;
    if let Some(seed) = seed {
        splitter = splitter.with_seed(seed);
    }
    let split: SplitData = splitter
        .split(&encoded, &args.target)
        .context("failed to split rows")?;
    // Models reuse the split seed so an unseeded run is still replayable.
    let seed = split.seed;
    let class_names = split.class_names();

    // 3. Decision tree
    let tree = DecisionTreeConfig::new()
        .with_criterion(criterion)
        .with_max_depth(args.max_depth)
        .with_seed(seed)
        .fit(&split.train_features, &split.train_labels)
        .context("decision tree training failed")?;
    let tree_eval = evaluate_holdout(&tree, &split.test_features, &split.test_labels, &class_names)
        .context("decision tree evaluation failed")?;
    info!(accuracy = tree_eval.accuracy(), depth = tree.depth(), "decision tree evaluated");
    let tree_run = ModelRun {
        name: "decision_tree",
        ranked: rank_features(&tree.feature_importances(), &split.feature_names),
        evaluation: tree_eval,
    };

    // 4. Random forest
    let forest = RandomForestConfig::new(args.n_trees)?
        .with_criterion(criterion)
        .with_max_depth(args.max_depth)
        .with_voting(voting)
        .with_max_features(max_features)
        .with_bootstrap(!args.no_bootstrap)
        .with_seed(seed)
        .fit(&split.train_features, &split.train_labels)
        .context("random forest training failed")?;
    let forest_eval = evaluate_holdout(&forest, &split.test_features, &split.test_labels, &class_names)
        .context("random forest evaluation failed")?;
    info!(accuracy = forest_eval.accuracy(), n_trees = forest.n_trees(), "random forest evaluated");
    let forest_run = ModelRun {
        name: "random_forest",
        ranked: rank_features(&forest.feature_importances(), &split.feature_names),
        evaluation: forest_eval,
    };

    // 5. Print reports
    let runs = [tree_run, forest_run];
    for run in &runs {
        print_run(run);
    }

    // 6. Write evaluation JSON
    if let Some(experiment) = experiment {
        let writer = ResultWriter::new(output_dir, experiment)?;
        let summary = SplitSummary {
            target: &args.target,
            test_fraction: args.test_fraction,
            seed,
            n_train: split.train_labels.len(),
            n_test: split.test_labels.len(),
            feature_names: &split.feature_names,
        };
        let models: Vec<ModelMetrics<'_>> = runs.iter().map(model_metrics).collect();
        writer.write_evaluation(&summary, &models)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Explore {
            data,
            output_dir,
            explore: args,
        } => {
            let table = load(&data)?;
            let charts = explore(&table, &args, &output_dir)?;
            let output = ExploreOutput {
                n_rows: table.len(),
                charts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Evaluate {
            data,
            output_dir,
            model,
        } => {
            let table = load(&data)?;
            evaluate(&table, &model, cli.seed, &output_dir)?;
        }

        Command::Run {
            data,
            output_dir,
            explore: explore_args,
            model,
        } => {
            let table = load(&data)?;
            match explore(&table, &explore_args, &output_dir) {
                Ok(charts) => info!(n_charts = charts.len(), "exploration complete"),
                Err(e) => warn!(error = format!("{e:#}"), "chart rendering failed, continuing"),
            }
            evaluate(&table, &model, cli.seed, &output_dir)?;
        }
    }

    Ok(())
}
