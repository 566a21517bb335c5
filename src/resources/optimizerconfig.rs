//! Optimizer configuration.
//!
//! Settings loaded from an INI configuration file. Every key has a safe
//! default, so a missing file or a partial file still yields a usable
//! configuration. Command line flags are applied on top by the binary.
//!
//! # Configuration File Format
//!
//! ```ini
//! [optimizer]
//! num_loops = 100
//! actions_per_zone = 500
//! step_dt = 0.1
//! init_dt = 0.01
//! seed = 42
//!
//! [structure]
//! tether_radius = 1.0
//! move_step = 0.25
//! rotate_degrees = 30.0
//!
//! [zones]
//! strategy = rings
//! origin_x = 200.0
//! origin_y = 200.0
//!
//! [io]
//! positions = positions.csv
//! typed = true
//! default_kind = LHCII
//! shapes = shapes.json
//! max_structures = 211
//! log_dir = log
//! output_dir = output
//! ```

use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use std::path::PathBuf;

use crate::components::structure::ActionParams;
use crate::error::SimError;
use crate::optimizer::zonestrategy::ZoneStrategyKind;

/// Default safe values for startup
const DEFAULT_NUM_LOOPS: u32 = 100;
const DEFAULT_ACTIONS_PER_ZONE: u32 = 500;
const DEFAULT_STEP_DT: f32 = 0.1;
const DEFAULT_INIT_DT: f32 = 0.01;
const DEFAULT_ORIGIN: Vec2 = Vec2::new(200.0, 200.0);
const DEFAULT_MAX_STRUCTURES: usize = 211;
const DEFAULT_POSITIONS_PATH: &str = "positions.csv";
const DEFAULT_KIND: &str = "LHCII";
const DEFAULT_LOG_DIR: &str = "log";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_CONFIG_PATH: &str = "./grana.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Number of passes through every zone.
    pub num_loops: u32,
    /// Trials per zone in each pass.
    pub actions_per_zone: u32,
    /// Backend time increment for each measurement step.
    pub step_dt: f32,
    /// Backend time increment for the settling step before the first pass.
    pub init_dt: f32,
    /// Seed for the shared generator; random when absent.
    pub seed: Option<u64>,
    /// Move/rotate tunables.
    pub action: ActionParams,
    pub strategy: ZoneStrategyKind,
    /// Reference point for zone distances.
    pub origin: Vec2,
    /// CSV with `type, x, y, angle, area` rows, or `x, y, angle, area` when
    /// `typed` is false.
    pub positions: PathBuf,
    /// Whether position rows carry a type column.
    pub typed: bool,
    /// Type given to untyped rows and to synthetic structures.
    pub default_kind: String,
    /// Optional JSON shape library.
    pub shapes: Option<PathBuf>,
    /// Population cap when spawning from positions.
    pub max_structures: usize,
    pub log_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizerConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            num_loops: DEFAULT_NUM_LOOPS,
            actions_per_zone: DEFAULT_ACTIONS_PER_ZONE,
            step_dt: DEFAULT_STEP_DT,
            init_dt: DEFAULT_INIT_DT,
            seed: None,
            action: ActionParams::default(),
            strategy: ZoneStrategyKind::Rings,
            origin: DEFAULT_ORIGIN,
            positions: PathBuf::from(DEFAULT_POSITIONS_PATH),
            typed: true,
            default_kind: DEFAULT_KIND.to_string(),
            shapes: None,
            max_structures: DEFAULT_MAX_STRUCTURES,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or a value cannot be parsed.
    pub fn load_from_file(&mut self) -> Result<(), SimError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| SimError::Config(format!("Failed to load config file: {}", e)))?;

        // [optimizer] section
        if let Some(n) = config.getuint("optimizer", "num_loops").map_err(SimError::Config)? {
            self.num_loops = n as u32;
        }
        if let Some(n) = config
            .getuint("optimizer", "actions_per_zone")
            .map_err(SimError::Config)?
        {
            self.actions_per_zone = n as u32;
        }
        if let Some(dt) = config.getfloat("optimizer", "step_dt").map_err(SimError::Config)? {
            self.step_dt = dt as f32;
        }
        if let Some(dt) = config.getfloat("optimizer", "init_dt").map_err(SimError::Config)? {
            self.init_dt = dt as f32;
        }
        if let Some(seed) = config.getuint("optimizer", "seed").map_err(SimError::Config)? {
            self.seed = Some(seed);
        }

        // [structure] section
        if let Some(r) = config
            .getfloat("structure", "tether_radius")
            .map_err(SimError::Config)?
        {
            self.action.tether_radius = r as f32;
        }
        if let Some(s) = config.getfloat("structure", "move_step").map_err(SimError::Config)? {
            self.action.move_step = s as f32;
        }
        if let Some(d) = config
            .getfloat("structure", "rotate_degrees")
            .map_err(SimError::Config)?
        {
            self.action.rotate_degrees = d as f32;
        }

        // [zones] section
        if let Some(kind) = config.get("zones", "strategy") {
            self.strategy = kind.parse().map_err(SimError::Config)?;
        }
        if let Some(x) = config.getfloat("zones", "origin_x").map_err(SimError::Config)? {
            self.origin.x = x as f32;
        }
        if let Some(y) = config.getfloat("zones", "origin_y").map_err(SimError::Config)? {
            self.origin.y = y as f32;
        }

        // [io] section
        if let Some(path) = config.get("io", "positions") {
            self.positions = PathBuf::from(path);
        }
        if let Some(typed) = config.getbool("io", "typed").map_err(SimError::Config)? {
            self.typed = typed;
        }
        if let Some(kind) = config.get("io", "default_kind").filter(|k| !k.is_empty()) {
            self.default_kind = kind;
        }
        if let Some(path) = config.get("io", "shapes").filter(|p| !p.is_empty()) {
            self.shapes = Some(PathBuf::from(path));
        }
        if let Some(n) = config.getuint("io", "max_structures").map_err(SimError::Config)? {
            self.max_structures = n as usize;
        }
        if let Some(dir) = config.get("io", "log_dir") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(dir) = config.get("io", "output_dir") {
            self.output_dir = PathBuf::from(dir);
        }

        info!(
            "Loaded config: loops={}, actions/zone={}, dt={}, strategy={}, origin=({}, {}), tether={}",
            self.num_loops,
            self.actions_per_zone,
            self.step_dt,
            self.strategy,
            self.origin.x,
            self.origin.y,
            self.action.tether_radius
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), SimError> {
        let mut config = Ini::new();

        // [optimizer] section
        config.set("optimizer", "num_loops", Some(self.num_loops.to_string()));
        config.set(
            "optimizer",
            "actions_per_zone",
            Some(self.actions_per_zone.to_string()),
        );
        config.set("optimizer", "step_dt", Some(self.step_dt.to_string()));
        config.set("optimizer", "init_dt", Some(self.init_dt.to_string()));
        if let Some(seed) = self.seed {
            config.set("optimizer", "seed", Some(seed.to_string()));
        }

        // [structure] section
        config.set(
            "structure",
            "tether_radius",
            Some(self.action.tether_radius.to_string()),
        );
        config.set("structure", "move_step", Some(self.action.move_step.to_string()));
        config.set(
            "structure",
            "rotate_degrees",
            Some(self.action.rotate_degrees.to_string()),
        );

        // [zones] section
        config.set("zones", "strategy", Some(self.strategy.to_string()));
        config.set("zones", "origin_x", Some(self.origin.x.to_string()));
        config.set("zones", "origin_y", Some(self.origin.y.to_string()));

        // [io] section
        config.set("io", "positions", Some(self.positions.display().to_string()));
        config.set("io", "typed", Some(self.typed.to_string()));
        config.set("io", "default_kind", Some(self.default_kind.clone()));
        if let Some(shapes) = &self.shapes {
            config.set("io", "shapes", Some(shapes.display().to_string()));
        }
        config.set("io", "max_structures", Some(self.max_structures.to_string()));
        config.set("io", "log_dir", Some(self.log_dir.display().to_string()));
        config.set("io", "output_dir", Some(self.output_dir.display().to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| SimError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
