//! Train the readout head on a monthly financial record table.
//!
//! Usage:
//! ```bash
//! cargo run --release --bin train -- --data data/financial_data.csv
//! cargo run --release --bin train -- --synthetic --epochs 200 --seed 7
//! ```

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ltc_trading::{
    load_records, normalize_records, synthetic_records, Trainer, TrainerConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the LTC reservoir readout on monthly equity data")]
struct Args {
    /// Path to the record table (CSV); omit to use synthetic data
    #[arg(long)]
    data: Option<PathBuf>,

    /// Generate a synthetic record table instead of reading a file
    #[arg(long)]
    synthetic: bool,

    /// Symbols in the synthetic table
    #[arg(long, default_value = "10")]
    symbols: usize,

    /// Months per symbol in the synthetic table
    #[arg(long, default_value = "24")]
    months: usize,

    /// Number of training epochs
    #[arg(long, default_value = "1000")]
    epochs: usize,

    /// RNG seed; omit for a fresh seed per run
    #[arg(long)]
    seed: Option<u64>,

    /// Adam learning rate
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Initial exploration rate
    #[arg(long, default_value = "0.1")]
    epsilon: f64,

    /// Multiplicative epsilon decay per epoch
    #[arg(long, default_value = "0.995")]
    epsilon_decay: f64,

    /// Run the cells without sensory input injection
    #[arg(long)]
    no_sensory: bool,

    /// Carry cell state across symbol boundaries instead of resetting
    #[arg(long)]
    no_state_reset: bool,

    /// Log a progress line every N epochs
    #[arg(long, default_value = "100")]
    log_freq: usize,

    /// Write the trained head parameters as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load the full trainer configuration from a JSON file
    /// (command-line hyperparameters are ignored)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut records = match (&args.data, args.synthetic) {
        (Some(path), _) => {
            info!(path = %path.display(), "loading record table");
            load_records(path)?
        }
        (None, _) => {
            info!(
                symbols = args.symbols,
                months = args.months,
                "no data file given, generating synthetic table"
            );
            let names: Vec<String> = (0..args.symbols).map(|i| format!("SYM{:02}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            synthetic_records(&refs, args.months, &mut rng)
        }
    };

    info!(records = records.len(), "normalizing features");
    normalize_records(&mut records);

    let config = match &args.config {
        Some(path) => TrainerConfig::from_file(path)?,
        None => TrainerConfig {
            epochs: args.epochs,
            seed: args.seed,
            learning_rate: args.learning_rate,
            epsilon_start: args.epsilon,
            epsilon_decay: args.epsilon_decay,
            sensory_coupling: !args.no_sensory,
            reset_state_on_symbol_change: !args.no_state_reset,
            ..Default::default()
        },
    };

    let mut trainer = Trainer::new(config)?;

    info!(
        epochs = trainer.config().epochs,
        combined_units = trainer.config().combined_units(),
        actions = trainer.config().actions,
        "starting training"
    );

    let pb = ProgressBar::new(trainer.config().epochs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let log_freq = args.log_freq.max(1);
    trainer.train(&records, |report| {
        pb.set_position(report.epoch as u64 + 1);
        pb.set_message(format!(
            "reward: {:>9.6} | ε: {:.4}",
            report.mean_reward, report.epsilon
        ));

        if (report.epoch + 1) % log_freq == 0 {
            info!(
                epoch = report.epoch + 1,
                mean_reward = report.mean_reward,
                epsilon = report.epsilon,
                "epoch complete"
            );
            for (symbol, total) in &report.cumulative_reward {
                info!(symbol = %symbol, cumulative_reward = total, "symbol progress");
            }
        }
    })?;

    pb.finish_with_message("training complete");

    println!("\n=== Cumulative reward per symbol ===");
    for (symbol, total) in trainer.cumulative_reward() {
        println!("{:<8} {:>12.6}", symbol, total);
    }

    if let Some(path) = &args.save {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), trainer.head())?;
        println!("\nHead parameters saved to {}", path.display());
    }

    Ok(())
}
