//! Backend systems.
//!
//! Submodules overview
//! - [`collision`] – pairwise contact detection and event emission
//! - [`time`] – advance simulation time
pub mod collision;
pub mod time;
