//! ECS components for structures.
//!
//! Submodules overview:
//! - [`mapposition`] – world-space position of a body
//! - [`polygoncollider`] – convex polygon shapes, bounding boxes and penetration tests
//! - [`rotation`] – body angle in radians
//! - [`structure`] – tether anchor, last action and the move/rotate/undo logic

pub mod mapposition;
pub mod polygoncollider;
pub mod rotation;
pub mod structure;
