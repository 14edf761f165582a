use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use social_seq_prep::config::{Config, Split};
use social_seq_prep::pipeline;

#[derive(Parser, Debug)]
#[clap(
    name = "social-seq-prep",
    about = "Prepare social random-walk sequence data for sequence models"
)]
struct Cli {
    /// Dataset directory holding rating.csv / trustnetwork.csv and all outputs
    #[clap(long, default_value = "dataset/epinions")]
    data_dir: PathBuf,

    /// Raw rating table (CSV or Parquet) to remap into the dataset directory
    #[clap(long, requires = "raw_trust")]
    raw_ratings: Option<PathBuf>,

    /// Raw trust table (CSV or Parquet) to remap into the dataset directory
    #[clap(long, requires = "raw_ratings")]
    raw_trust: Option<PathBuf>,

    /// Precomputed shortest-path table (.npy, users x users) to use instead of computing one
    #[clap(long)]
    spd_table: Option<PathBuf>,

    /// Precomputed rating matrix (.npy, [user_id][item_id]) to use instead of building one
    #[clap(long)]
    rating_matrix: Option<PathBuf>,

    /// Random seed for the split, anchor selection and walks
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Fraction of ratings held out for each of valid and test
    #[clap(long, default_value = "0.1")]
    test_ratio: f64,

    /// Random walk length (encoder input length)
    #[clap(long, default_value = "50")]
    walk_length: usize,

    /// Item list length (decoder input length)
    #[clap(long, default_value = "50")]
    item_seq_len: usize,

    /// Return parameter 0-10; the return bias is this value / 10
    #[clap(long, default_value = "1")]
    return_param: u8,

    /// Number of anchors to walk from (all nodes when omitted)
    #[clap(long)]
    num_anchors: Option<usize>,

    /// Walks per anchor in the training split
    #[clap(long, default_value = "10")]
    train_repeat: usize,

    /// Splits to process
    #[clap(long, value_delimiter = ',', default_value = "train,test")]
    splits: Vec<Split>,

    /// Regenerate walk tables even if they already exist
    #[clap(long)]
    force_walks: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl From<Cli> for Config {
    fn from(args: Cli) -> Self {
        Self {
            data_dir: args.data_dir,
            raw_ratings: args.raw_ratings,
            raw_trust: args.raw_trust,
            spd_table: args.spd_table,
            rating_matrix: args.rating_matrix,
            seed: args.seed,
            test_ratio: args.test_ratio,
            walk_length: args.walk_length,
            item_seq_len: args.item_seq_len,
            return_param: args.return_param,
            num_anchors: args.num_anchors,
            train_repeat: args.train_repeat,
            splits: args.splits,
            force_walks: args.force_walks,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = Config::from(args);

    log::info!("Starting sequence data preparation");
    log::info!("Data directory: {}", config.data_dir.display());
    log::info!(
        "walk_length={} item_seq_len={} return_param={} seed={}",
        config.walk_length,
        config.item_seq_len,
        config.return_param,
        config.seed
    );

    let outcomes = pipeline::run(&config)?;

    for outcome in outcomes {
        log::info!(
            "{}: {} nodes, {} walks, {} records",
            outcome.split,
            outcome.node_count,
            outcome.walk_count,
            outcome.record_count
        );
    }

    Ok(())
}
