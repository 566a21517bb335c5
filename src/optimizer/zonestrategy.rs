//! Zone strategies.
//!
//! A [`ZoneStrategy`] splits the structure population into an ordered list of
//! zones by distance from an origin point. The agent walks the zones in order
//! and only perturbs structures of the current zone.
//!
//! Two layouts exist:
//!
//! - [`ZoneStrategyKind::Rings`]: five disjoint rings, then one catch-all zone
//!   holding the whole population. Ring membership is strict on both sides, so
//!   a structure sitting exactly on a boundary belongs to neither ring.
//! - [`ZoneStrategyKind::ExpandingCircle`]: five nested discs; a structure near
//!   the centre is in every disc whose radius it is inside.
//!
//! Membership is a snapshot of the positions at construction or
//! [`ZoneStrategy::reset`] time. Structures that move during a pass stay in the
//! zones they were assigned until the next reset.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use std::fmt;
use std::str::FromStr;

use crate::space::Space;

/// (min, max) distances of the Rings layout, before the catch-all.
pub const RING_BOUNDS: [(f32, f32); 5] = [
    (0.0, 89.0),
    (89.0, 127.0),
    (127.0, 155.0),
    (155.0, 178.0),
    (178.0, 200.0),
];

/// Radii of the ExpandingCircle layout.
pub const CIRCLE_THRESHOLDS: [f32; 5] = [89.0, 127.0, 155.0, 178.0, 200.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneStrategyKind {
    #[default]
    Rings,
    ExpandingCircle,
}

impl ZoneStrategyKind {
    /// The band layout used by this strategy.
    pub fn default_bands(self) -> Vec<Band> {
        match self {
            ZoneStrategyKind::Rings => RING_BOUNDS
                .iter()
                .map(|&(min, max)| Band::Ring { min, max })
                .chain(std::iter::once(Band::All))
                .collect(),
            ZoneStrategyKind::ExpandingCircle => CIRCLE_THRESHOLDS
                .iter()
                .map(|&max| Band::Disc { max })
                .collect(),
        }
    }
}

impl fmt::Display for ZoneStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneStrategyKind::Rings => write!(f, "rings"),
            ZoneStrategyKind::ExpandingCircle => write!(f, "expanding_circle"),
        }
    }
}

impl FromStr for ZoneStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rings" => Ok(ZoneStrategyKind::Rings),
            "expanding_circle" | "expandingcircle" => Ok(ZoneStrategyKind::ExpandingCircle),
            other => Err(format!(
                "unknown zone strategy '{}' (expected rings or expanding_circle)",
                other
            )),
        }
    }
}

/// Distance band deciding zone membership.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    /// `min < d < max`.
    Ring { min: f32, max: f32 },
    /// `d < max`.
    Disc { max: f32 },
    /// Every structure of the population.
    All,
}

impl Band {
    pub fn contains(&self, distance: f32) -> bool {
        match *self {
            Band::Ring { min, max } => distance > min && distance < max,
            Band::Disc { max } => distance < max,
            Band::All => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZoneStrategy {
    kind: ZoneStrategyKind,
    origin: Vec2,
    bands: Vec<Band>,
    population: Vec<Entity>,
    zones: Vec<Vec<Entity>>,
    cursor: usize,
}

impl ZoneStrategy {
    /// Partition `population` with the default bands of `kind`.
    pub fn new(kind: ZoneStrategyKind, origin: Vec2, population: Vec<Entity>, space: &Space) -> Self {
        Self::with_bands(kind, origin, kind.default_bands(), population, space)
    }

    /// Partition `population` with an explicit band list.
    pub fn with_bands(
        kind: ZoneStrategyKind,
        origin: Vec2,
        bands: Vec<Band>,
        population: Vec<Entity>,
        space: &Space,
    ) -> Self {
        let mut strategy = Self {
            kind,
            origin,
            bands,
            population,
            zones: Vec::new(),
            cursor: 0,
        };
        strategy.zones = strategy.create_zones(space);
        strategy
    }

    pub fn rings(origin: Vec2, population: Vec<Entity>, space: &Space) -> Self {
        Self::new(ZoneStrategyKind::Rings, origin, population, space)
    }

    pub fn expanding_circle(origin: Vec2, population: Vec<Entity>, space: &Space) -> Self {
        Self::new(ZoneStrategyKind::ExpandingCircle, origin, population, space)
    }

    fn create_zones(&self, space: &Space) -> Vec<Vec<Entity>> {
        self.bands
            .iter()
            .map(|band| {
                self.population
                    .iter()
                    .copied()
                    .filter(|&entity| match band {
                        Band::All => true,
                        _ => space
                            .position(entity)
                            .is_some_and(|pos| band.contains(pos.distance(self.origin))),
                    })
                    .collect()
            })
            .collect()
    }

    /// Members of the next zone, `None` once every zone has been handed out.
    pub fn next_zone(&mut self) -> Option<Vec<Entity>> {
        let zone = self.zones.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(zone)
    }

    /// Rewind to the first zone and recompute membership from current positions.
    pub fn reset(&mut self, space: &Space) {
        self.zones = self.create_zones(space);
        self.cursor = 0;
    }

    pub fn total_zones(&self) -> usize {
        self.bands.len()
    }

    pub fn zones(&self) -> &[Vec<Entity>] {
        &self.zones
    }

    /// Index of the first zone without members, if any.
    pub fn first_empty_zone(&self) -> Option<usize> {
        self.zones.iter().position(Vec::is_empty)
    }

    pub fn kind(&self) -> ZoneStrategyKind {
        self.kind
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }
}

impl Iterator for ZoneStrategy {
    type Item = Vec<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_zone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::polygoncollider::PolygonCollider;
    use crate::components::structure::Structure;

    fn spawn_at(space: &mut Space, x: f32, y: f32) -> Entity {
        space.spawn_structure(
            Structure::new("C2", Vec2::new(x, y), 0.0),
            0.0,
            PolygonCollider::rectangle(1.0, 1.0),
        )
    }

    #[test]
    fn test_ring_membership_is_strict_on_both_sides() {
        let ring = Band::Ring { min: 0.0, max: 89.0 };
        let next = Band::Ring { min: 89.0, max: 127.0 };
        assert!(!ring.contains(89.0));
        assert!(!next.contains(89.0));
        assert!(ring.contains(88.999));
        assert!(next.contains(89.001));
        assert!(!ring.contains(0.0));
        assert!(Band::All.contains(89.0));
    }

    #[test]
    fn test_disc_membership_is_strict_upper_bound() {
        assert!(Band::Disc { max: 89.0 }.contains(50.0));
        assert!(!Band::Disc { max: 89.0 }.contains(89.0));
    }

    #[test]
    fn test_default_band_counts() {
        let rings = ZoneStrategyKind::Rings.default_bands();
        assert_eq!(rings.len(), 6);
        assert_eq!(rings[5], Band::All);
        assert_eq!(ZoneStrategyKind::ExpandingCircle.default_bands().len(), 5);
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("rings".parse::<ZoneStrategyKind>(), Ok(ZoneStrategyKind::Rings));
        assert_eq!(
            "Expanding-Circle".parse::<ZoneStrategyKind>(),
            Ok(ZoneStrategyKind::ExpandingCircle)
        );
        assert!("spiral".parse::<ZoneStrategyKind>().is_err());
        assert_eq!(ZoneStrategyKind::ExpandingCircle.to_string(), "expanding_circle");
    }

    #[test]
    fn test_boundary_structure_only_in_catch_all() {
        let mut space = Space::new();
        let e = spawn_at(&mut space, 200.0 + 89.0, 200.0);
        let strategy = ZoneStrategy::rings(Vec2::new(200.0, 200.0), vec![e], &space);
        assert!(strategy.zones()[0].is_empty());
        assert!(strategy.zones()[1].is_empty());
        assert_eq!(strategy.zones()[5], vec![e]);
    }

    #[test]
    fn test_expanding_circle_is_nested() {
        let mut space = Space::new();
        let e = spawn_at(&mut space, 200.0, 250.0);
        let strategy = ZoneStrategy::expanding_circle(Vec2::new(200.0, 200.0), vec![e], &space);
        assert_eq!(strategy.total_zones(), 5);
        for (zone, threshold) in strategy.zones().iter().zip(CIRCLE_THRESHOLDS) {
            assert!(threshold > 50.0);
            assert_eq!(zone, &vec![e]);
        }
    }

    #[test]
    fn test_iteration_stops_and_reset_rewinds() {
        let mut space = Space::new();
        let e = spawn_at(&mut space, 210.0, 200.0);
        let mut strategy = ZoneStrategy::rings(Vec2::new(200.0, 200.0), vec![e], &space);
        assert_eq!(strategy.by_ref().count(), 6);
        assert!(strategy.next_zone().is_none());

        strategy.reset(&space);
        assert_eq!(strategy.next_zone(), Some(vec![e]));
    }

    #[test]
    fn test_reset_recomputes_membership() {
        let mut space = Space::new();
        let e = spawn_at(&mut space, 210.0, 200.0);
        let mut strategy = ZoneStrategy::rings(Vec2::new(200.0, 200.0), vec![e], &space);
        assert_eq!(strategy.zones()[0], vec![e]);

        space
            .world_mut()
            .get_mut::<crate::components::mapposition::MapPosition>(e)
            .unwrap()
            .pos = Vec2::new(300.0, 200.0);
        // Snapshot: unchanged until reset.
        assert_eq!(strategy.zones()[0], vec![e]);

        strategy.reset(&space);
        assert!(strategy.zones()[0].is_empty());
        assert_eq!(strategy.zones()[1], vec![e]);
    }

    #[test]
    fn test_zones_built_on_construction_and_rebuilt_mid_iteration() {
        let mut space = Space::new();
        let near = spawn_at(&mut space, 205.0, 200.0);
        let far = spawn_at(&mut space, 200.0, 290.0);
        let mut strategy = ZoneStrategy::with_bands(
            ZoneStrategyKind::ExpandingCircle,
            Vec2::new(200.0, 200.0),
            vec![Band::Disc { max: 50.0 }, Band::Disc { max: 100.0 }],
            vec![near, far],
            &space,
        );
        assert_eq!(strategy.kind(), ZoneStrategyKind::ExpandingCircle);
        assert_eq!(strategy.origin(), Vec2::new(200.0, 200.0));
        assert_eq!(strategy.zones(), &[vec![near], vec![near, far]]);

        assert_eq!(strategy.next_zone(), Some(vec![near]));
        strategy.reset(&space);
        assert_eq!(strategy.next_zone(), Some(vec![near]));
        assert_eq!(strategy.next_zone(), Some(vec![near, far]));
        assert_eq!(strategy.next_zone(), None);
    }

    #[test]
    fn test_first_empty_zone() {
        let mut space = Space::new();
        let e = spawn_at(&mut space, 210.0, 200.0);
        let strategy = ZoneStrategy::rings(Vec2::new(200.0, 200.0), vec![e], &space);
        assert_eq!(strategy.first_empty_zone(), Some(1));

        let single = ZoneStrategy::with_bands(
            ZoneStrategyKind::ExpandingCircle,
            Vec2::new(200.0, 200.0),
            vec![Band::Disc { max: 50.0 }],
            vec![e],
            &space,
        );
        assert_eq!(single.first_empty_zone(), None);
    }
}
