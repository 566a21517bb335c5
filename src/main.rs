//! Grana Relax main entry point.
//!
//! Loads a packed layout of structures, then repeatedly runs the overlap agent
//! through every zone of the chosen zone strategy. After each pass a progress
//! row is appended to the job log and the coordinates of the last zone are
//! written out.
//!
//! Settings come from an INI file (`./grana.ini` unless `--config` says
//! otherwise); command line flags override it.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --filename positions.csv --num-loops 10 --seed 1
//! cargo run --release -- --synthetic 300 --strategy expanding-circle
//! ```

use clap::Parser;
use fastrand::Rng;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use grana_relax::error::SimError;
use grana_relax::export::{
    ProgressLog, ProgressRow, coordinates_path, snapshot, write_coordinates,
};
use grana_relax::optimizer::agent::OverlapAgent;
use grana_relax::optimizer::zonestrategy::ZoneStrategyKind;
use grana_relax::resources::optimizerconfig::OptimizerConfig;
use grana_relax::resources::shapelibrary::ShapeLibrary;
use grana_relax::space::Space;
use grana_relax::spawner::{DEFAULT_FIELD_RADIUS, RowLayout, Spawner, load_positions};

/// Zone-scheduled overlap relaxation for packed 2-D structures
#[derive(Parser)]
#[command(version, about = "Reduces overlap in packed 2-D structure layouts by greedy zone-scheduled local search.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./grana.ini")]
    config: PathBuf,

    /// CSV position file (type, x, y, angle, area). Overrides [io] positions.
    #[arg(long, value_name = "PATH")]
    filename: Option<PathBuf>,

    /// Position file has only coordinates (x, y, angle, area); rows are tagged
    /// with the configured default kind.
    #[arg(long)]
    assign_types: bool,

    /// Place N structures at random around the origin instead of reading positions.
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Number of passes through all zones.
    #[arg(long, value_name = "N")]
    num_loops: Option<u32>,

    /// Trials per zone in each pass.
    #[arg(long, value_name = "N")]
    actions_per_zone: Option<u32>,

    /// Zone strategy: rings or expanding-circle.
    #[arg(long, value_name = "KIND")]
    strategy: Option<ZoneStrategyKind>,

    /// Seed for the random generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Identifier used in log and output file names.
    #[arg(long, default_value = "0")]
    job_id: String,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    save_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> OptimizerConfig {
    let mut config = OptimizerConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }

    if let Some(path) = &cli.filename {
        config.positions = path.clone();
    }
    if cli.assign_types {
        config.typed = false;
    }
    if let Some(n) = cli.num_loops {
        config.num_loops = n;
    }
    if let Some(n) = cli.actions_per_zone {
        config.actions_per_zone = n;
    }
    if let Some(kind) = cli.strategy {
        config.strategy = kind;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config
}

fn run(cli: Cli) -> Result<(), SimError> {
    let config = load_config(&cli);

    if cli.save_config {
        return config.save_to_file();
    }

    let library = match &config.shapes {
        Some(path) => ShapeLibrary::load_from_file(path)?,
        None => ShapeLibrary::new(),
    };
    if library.is_empty() {
        info!("No shape templates loaded; every type uses the fallback octagon");
    } else {
        info!("Shape library: {} template(s)", library.len());
    }

    let mut rng = match config.seed {
        Some(seed) => Rng::with_seed(seed),
        None => Rng::new(),
    };

    let mut space = Space::new();
    let spawner = Spawner::new(library, config.max_structures);
    let population = match cli.synthetic {
        Some(count) => spawner.spawn_random(
            &mut space,
            count,
            &config.default_kind,
            config.origin,
            DEFAULT_FIELD_RADIUS,
            &mut rng,
        ),
        None => {
            let layout = if config.typed {
                RowLayout::Typed
            } else {
                RowLayout::Untyped {
                    kind: config.default_kind.clone(),
                }
            };
            let records = load_positions(&config.positions, &layout)?;
            spawner.spawn_records(&mut space, records, &mut rng)
        }
    };
    info!(
        "Spawned {} structures, total shape area {:.2}",
        population.len(),
        space.total_area()
    );

    let mut agent = OverlapAgent::from_config(&config, &mut space, rng);
    let initial = agent.initialize(&mut space, config.init_dt);
    let strategy = agent.strategy();
    info!(
        "Initial overlap {:.2} using {} around ({}, {}) with {} zones",
        initial,
        strategy.kind(),
        strategy.origin().x,
        strategy.origin().y,
        strategy.total_zones()
    );

    let log = ProgressLog::create(&config.log_dir, &cli.job_id)?;
    std::fs::create_dir_all(&config.output_dir)?;
    let actions_per_zone = config.actions_per_zone as usize;

    for step_num in 0..config.num_loops {
        let start = Instant::now();
        let summary = agent.run(&mut space, actions_per_zone)?;
        let row = ProgressRow {
            job_id: cli.job_id.clone(),
            step_num,
            total_actions: agent.total_actions(actions_per_zone),
            overlap_begin: summary.overlap_begin,
            overlap_end: summary.overlap_end,
            elapsed: start.elapsed(),
        };
        log.append(&row)?;
        info!(
            "Pass {}: overlap {:.2} -> {:.2}, {} of {} trials kept ({:.3}s)",
            step_num,
            summary.overlap_begin,
            summary.overlap_end,
            summary.accepted_count(),
            summary.trials.len(),
            row.elapsed.as_secs_f64()
        );

        let path = coordinates_path(
            &config.output_dir,
            &cli.job_id,
            step_num,
            summary.overlap_end,
            &chrono::Local::now(),
        );
        write_coordinates(&path, &snapshot(&space, &summary.last_zone))?;
    }

    let accumulator = space.accumulator();
    info!(
        "Done after {} steps: {} penetrating contacts seen, final overlap {:.2}",
        space.time().step_count,
        accumulator.lifetime_event_count,
        agent.overlap()
    );
    Ok(())
}
