//! Per-type shape templates.
//!
//! Structure geometry is looked up by the structure's type tag. Templates come
//! from a JSON file of the form
//!
//! ```json
//! {
//!   "C2S2M2": { "shapes": [[[0.0, 0.0], [4.0, 0.0], [4.0, 3.0]], [[...]]] },
//!   "LHCII":  { "shapes": [[[-2.0, -2.0], [2.0, -2.0], [0.0, 2.0]]] }
//! }
//! ```
//!
//! where each shape is a vertex list in body-local coordinates (the convex hull
//! is taken). Unknown types fall back to a regular octagon whose area matches
//! the area reported for the structure, or [`DEFAULT_AREA`].

use glam::Vec2;
use log::warn;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

use crate::components::polygoncollider::{ConvexShape, PolygonCollider};
use crate::error::SimError;

pub const DEFAULT_AREA: f32 = 100.0;
const FALLBACK_SIDES: usize = 8;

#[derive(Debug, Deserialize)]
struct ShapeTemplate {
    shapes: Vec<Vec<[f32; 2]>>,
}

#[derive(Debug, Clone, Default)]
pub struct ShapeLibrary {
    templates: FxHashMap<String, Vec<ConvexShape>>,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads shape templates from a JSON file at the specified path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file_content = std::fs::read_to_string(path)?;
        Self::from_json_str(&file_content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let raw: FxHashMap<String, ShapeTemplate> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for (kind, template) in raw {
            let shapes: Vec<ConvexShape> = template
                .shapes
                .iter()
                .filter_map(|coords| {
                    let points: Vec<Vec2> = coords.iter().map(|&[x, y]| Vec2::new(x, y)).collect();
                    ConvexShape::from_points(&points)
                })
                .collect();
            if shapes.len() < template.shapes.len() {
                warn!(
                    "Shape library: dropped {} degenerate shape(s) for type {}",
                    template.shapes.len() - shapes.len(),
                    kind
                );
            }
            if !shapes.is_empty() {
                library.templates.insert(kind, shapes);
            }
        }
        Ok(library)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.templates.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Collider for a structure of type `kind`.
    pub fn collider_for(&self, kind: &str, area: Option<f32>) -> PolygonCollider {
        match self.templates.get(kind) {
            Some(shapes) => PolygonCollider::new(shapes.clone()),
            None => {
                let area = area.filter(|a| *a > 0.0).unwrap_or(DEFAULT_AREA);
                PolygonCollider::new(vec![ConvexShape::regular(FALLBACK_SIDES, area)])
            }
        }
    }
}
