//! Structure population setup.
//!
//! Reads position data and places structures into a [`Space`]. Position files
//! are CSV with a header row and the columns
//!
//! ```text
//! type, x, y, angle, area
//! ```
//!
//! `angle` (radians) and `area` may be left empty or omitted. A missing angle is
//! drawn uniformly at random; a missing area only matters for types without a
//! shape template (see [`ShapeLibrary`]).
//!
//! Coordinate-only files drop the `type` column (`x, y, angle, area`) and are
//! read with [`RowLayout::Untyped`], which tags every row with one kind.
//!
//! The population is capped at `max_structures`. Running out of rows before the
//! cap truncates the population instead of failing.

use bevy_ecs::prelude::Entity;
use fastrand::Rng;
use glam::Vec2;
use log::{info, warn};
use std::f32::consts::TAU;
use std::path::Path;

use crate::components::structure::Structure;
use crate::error::SimError;
use crate::resources::shapelibrary::ShapeLibrary;
use crate::space::Space;

/// Radius of the field used for synthetic placement.
pub const DEFAULT_FIELD_RADIUS: f32 = 200.0;

/// One structure as read from or written to position data.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub kind: String,
    pub position: Vec2,
    pub angle: Option<f32>,
    pub area: Option<f32>,
}

/// Column layout of position data.
#[derive(Debug, Clone, PartialEq)]
pub enum RowLayout {
    /// `type, x, y, angle, area`
    Typed,
    /// `x, y, angle, area`; every row gets `kind`.
    Untyped { kind: String },
}

impl RowLayout {
    fn x_column(&self) -> usize {
        match self {
            RowLayout::Typed => 1,
            RowLayout::Untyped { .. } => 0,
        }
    }
}

/// Parse position CSV text with a type column.
pub fn parse_positions(text: &str) -> Result<Vec<StructureRecord>, SimError> {
    parse_positions_as(text, &RowLayout::Typed)
}

/// Parse position CSV text. The first non-blank line is treated as a header
/// when its `x` column is not a number.
pub fn parse_positions_as(text: &str, layout: &RowLayout) -> Result<Vec<StructureRecord>, SimError> {
    let x_col = layout.x_column();
    let mut records = Vec::new();
    let mut first_row = true;
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let is_header = first_row && fields.get(x_col).is_some_and(|x| x.parse::<f32>().is_err());
        first_row = false;
        if is_header {
            continue;
        }
        if fields.len() < x_col + 2 {
            return Err(SimError::Parse {
                line: line_no,
                message: format!(
                    "expected at least {} columns, found {}",
                    x_col + 2,
                    fields.len()
                ),
            });
        }
        let number = |col: usize, name: &str| -> Result<Option<f32>, SimError> {
            match fields.get(col) {
                None | Some(&"") => Ok(None),
                Some(value) => value.parse::<f32>().map(Some).map_err(|e| SimError::Parse {
                    line: line_no,
                    message: format!("bad {} '{}': {}", name, value, e),
                }),
            }
        };
        let x = number(x_col, "x")?;
        let y = number(x_col + 1, "y")?;
        let (Some(x), Some(y)) = (x, y) else {
            return Err(SimError::Parse {
                line: line_no,
                message: "missing x or y".to_string(),
            });
        };
        let kind = match layout {
            RowLayout::Typed => fields[0].to_string(),
            RowLayout::Untyped { kind } => kind.clone(),
        };
        records.push(StructureRecord {
            kind,
            position: Vec2::new(x, y),
            angle: number(x_col + 2, "angle")?,
            area: number(x_col + 3, "area")?,
        });
    }
    Ok(records)
}

/// Read and parse a position file.
pub fn load_positions(path: impl AsRef<Path>, layout: &RowLayout) -> Result<Vec<StructureRecord>, SimError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let records = parse_positions_as(&text, layout)?;
    info!("Read {} position rows from {}", records.len(), path.display());
    Ok(records)
}

/// Uniform random angle in radians.
pub fn random_angle(rng: &mut Rng) -> f32 {
    TAU * rng.f32()
}

/// Random point in a circle. The radius is the fold of the sum of two uniform
/// draws, which gives an area-uniform distribution.
pub fn random_pos_in_circle(max_radius: f32, center: Vec2, rng: &mut Rng) -> Vec2 {
    let roll = rng.f32() + rng.f32();
    let folded = if roll > 1.0 { 2.0 - roll } else { roll };
    let r = folded * max_radius;
    center + Vec2::from_angle(random_angle(rng)) * r
}

pub struct Spawner {
    library: ShapeLibrary,
    max_structures: usize,
}

impl Spawner {
    pub fn new(library: ShapeLibrary, max_structures: usize) -> Self {
        Self {
            library,
            max_structures,
        }
    }

    /// Spawn structures from records until the cap or the records run out.
    pub fn spawn_records(
        &self,
        space: &mut Space,
        records: impl IntoIterator<Item = StructureRecord>,
        rng: &mut Rng,
    ) -> Vec<Entity> {
        let spawned: Vec<Entity> = records
            .into_iter()
            .take(self.max_structures)
            .map(|record| {
                let angle = record.angle.unwrap_or_else(|| random_angle(rng));
                let collider = self.library.collider_for(&record.kind, record.area);
                space.spawn_structure(
                    Structure::new(record.kind, record.position, angle),
                    angle,
                    collider,
                )
            })
            .collect();
        if spawned.len() < self.max_structures {
            warn!(
                "Position data ran out: spawned {} of {} requested structures",
                spawned.len(),
                self.max_structures
            );
        }
        spawned
    }

    /// Spawn `count` structures of type `kind` at random positions within
    /// `max_radius` of `center`, with random angles.
    pub fn spawn_random(
        &self,
        space: &mut Space,
        count: usize,
        kind: &str,
        center: Vec2,
        max_radius: f32,
        rng: &mut Rng,
    ) -> Vec<Entity> {
        (0..count)
            .map(|_| {
                let position = random_pos_in_circle(max_radius, center, rng);
                let angle = random_angle(rng);
                space.spawn_structure(
                    Structure::new(kind, position, angle),
                    angle,
                    self.library.collider_for(kind, None),
                )
            })
            .collect()
    }
}
