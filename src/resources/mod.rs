//! Long-lived data used by the backend and the optimizer.
//!
//! Overview
//! - `optimizerconfig` – INI-backed run configuration
//! - `overlapaccumulator` – penetration summed over the steps since the last reset
//! - `shapelibrary` – polygon templates keyed by structure type
//! - `worldtime` – simulation time, last delta and step count
pub mod optimizerconfig;
pub mod overlapaccumulator;
pub mod shapelibrary;
pub mod worldtime;
