use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mycel_core::battle::{run_indexed_battle, run_matrix};
use mycel_core::canonical;
use mycel_core::codec;
use mycel_core::config::BattleConfig;
use mycel_core::generator;
use mycel_core::grid::Grid;
use mycel_core::rule::RuleSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

const WARMUP_STEPS: u32 = 10;
const BENCHMARK_STEPS: u32 = 200;

#[derive(Parser)]
#[command(name = "mycel")]
#[command(about = "Colony battle simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Battle two canonical rule tables (decimal or 16-bit binary ids)
    Battle {
        id1: String,
        id2: String,

        /// Path to a battle config file (JSON); defaults apply otherwise
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit the outcome as JSON instead of a summary line
        #[arg(long)]
        json: bool,
    },
    /// Round-robin battles over a canonical index range
    Matrix {
        /// First canonical index of the range
        start: u16,

        /// Number of consecutive indices to enter
        #[arg(long, default_value_t = 8)]
        count: usize,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Round-robin battles over randomly sampled canonical indices
    Random {
        /// Number of indices to sample
        #[arg(long, default_value_t = 8)]
        count: usize,

        /// Sampling seed (a random one is drawn when omitted)
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Generate a seeded rule set and print its compact encoding
    Generate {
        /// Seed (any text; numeric text is hashed like any other)
        seed: String,

        #[arg(long, default_value_t = 12)]
        rules: usize,

        #[arg(long, default_value_t = 4)]
        elements: usize,

        /// Use the promotion-chain generator variant
        #[arg(long)]
        cycle: bool,
    },
    /// Decode a compact rule set id and print its rules
    Decode { id: String },
    /// Expand an expanding-variant index and report its canonical id
    Expanding { index: u32 },
    /// Run the step-throughput benchmark suite
    Benchmark,
    /// Dump the default battle configuration to stdout
    DumpDefaultConfig,
}

/// Canonical ids arrive as plain decimals or 16-bit binary genome strings.
fn parse_table_id(text: &str) -> Result<u16> {
    if let Ok(id) = canonical::parse_binary16(text) {
        return Ok(id);
    }
    text.parse::<u16>()
        .with_context(|| format!("'{text}' is not a decimal or 16-bit binary table id"))
}

fn load_config(path: Option<&PathBuf>) -> Result<BattleConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path).context("failed to open config file")?;
            serde_json::from_reader(BufReader::new(file)).context("failed to parse config")?
        }
        None => BattleConfig::default(),
    };
    config.validate().context("config validation error")?;
    Ok(config)
}

fn print_rule_set(set: &RuleSet) {
    for rule in set {
        println!("  {rule}");
    }
}

fn report_matrix(indices: &[u16], config: &BattleConfig, json: bool) -> Result<()> {
    let summary = run_matrix(indices, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("{} battles over {} tables", summary.records.len(), indices.len());
    for record in &summary.records {
        let verdict = match record.winner_id {
            Some(id) => format!("winner {id}"),
            None => "draw".to_owned(),
        };
        println!(
            "  {:>5} vs {:>5}: ratio {:.3} after {} ticks ({verdict})",
            record.id1, record.id2, record.ratio, record.evolve_count
        );
    }
    Ok(())
}

fn run_benchmark(grid_size: usize, steps: u32) -> Result<()> {
    let config = BattleConfig {
        grid_size,
        max_steps: 1,
        ..BattleConfig::default()
    };
    config.validate().context("benchmark config")?;

    let rules = vec![
        canonical::rule_set_from_expanding_index(4242)?,
        canonical::rule_set_from_expanding_index(8181)?,
    ];
    let mut grid = Grid::new(grid_size, grid_size, rules, vec![String::new(); 2])?;
    let near = config.start_offset;
    let far = grid_size - config.start_offset;
    grid.place_seeds(&[(near, near), (far, far)])?;

    grid.evolve_all(WARMUP_STEPS);
    let start = Instant::now();
    grid.evolve_all(steps);
    let elapsed = start.elapsed();

    let avg_step_us = elapsed.as_micros() as f64 / f64::from(steps);
    let steps_per_sec = 1_000_000.0 / avg_step_us;
    println!("--- {grid_size}x{grid_size} arena ---");
    println!("  Avg step:  {avg_step_us:.0} us ({steps_per_sec:.1} steps/sec)");
    println!("  Occupied:  {} cells", grid.population_counts().iter().sum::<u64>());
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Battle {
            id1,
            id2,
            config,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let id1 = parse_table_id(&id1)?;
            let id2 = parse_table_id(&id2)?;
            let record = run_indexed_battle(id1, id2, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!(
                    "{} vs {}: ratio {:.3} after {} ticks",
                    record.id1, record.id2, record.ratio, record.evolve_count
                );
                match record.winner_id {
                    Some(id) => println!("winner: {id} ({})", canonical::to_binary16(id)),
                    None => println!("draw"),
                }
            }
        }
        Commands::Matrix {
            start,
            count,
            config,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let end = u32::from(start) + count as u32;
            if end > u32::from(u16::MAX) + 1 {
                bail!("index range {start}..{end} leaves the 16-bit table space");
            }
            let indices: Vec<u16> = (u32::from(start)..end).map(|i| i as u16).collect();
            report_matrix(&indices, &config, json)?;
        }
        Commands::Random {
            count,
            seed,
            config,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            println!("sampling seed: {seed}");
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let indices: Vec<u16> = (0..count).map(|_| rng.random()).collect();
            report_matrix(&indices, &config, json)?;
        }
        Commands::Generate {
            seed,
            rules,
            elements,
            cycle,
        } => {
            let set = if cycle {
                generator::generate_cycle(rules, elements, seed.as_str())
            } else {
                generator::generate(rules, elements, seed.as_str())
            };
            println!("{} rules:", set.len());
            print_rule_set(&set);
            println!("id: {}", codec::encode(&set)?);
        }
        Commands::Decode { id } => {
            let set = codec::decode(&id)?;
            println!("{} rules:", set.len());
            print_rule_set(&set);
        }
        Commands::Expanding { index } => {
            let set = canonical::rule_set_from_expanding_index(index)?;
            let table = canonical::index_from_rule_set(&set);
            println!("expanding index {index} -> table {table} ({})", canonical::to_binary16(table));
            print_rule_set(&set);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p mycel-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== mycel step throughput ===");
            println!("Warmup: {WARMUP_STEPS} ticks, Benchmark: {BENCHMARK_STEPS} ticks");
            println!();
            for grid_size in [41, 121, 241] {
                run_benchmark(grid_size, BENCHMARK_STEPS)?;
            }
        }
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&BattleConfig::default())?);
        }
    }
    Ok(())
}
