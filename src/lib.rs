//! Grana Relax library.
//!
//! Relaxes a densely packed layout of 2-D structures by zone-scheduled greedy
//! local search: structures are nudged or turned at random, and a change is
//! only kept when it does not increase the total penetration depth reported by
//! the collision backend.
//!
//! - [`components`] – pose, geometry and the movable structure
//! - [`events`] – contact events and the overlap observer
//! - [`resources`] – accumulator, configuration, shape templates, time
//! - [`systems`] – contact detection and time update
//! - [`space`] – the collision backend handed to the optimizer
//! - [`optimizer`] – zone strategies and the overlap agent
//! - [`spawner`] – population setup from position data
//! - [`export`] – progress log and coordinate snapshots

pub mod components;
pub mod error;
pub mod events;
pub mod export;
pub mod optimizer;
pub mod resources;
pub mod space;
pub mod spawner;
pub mod systems;
