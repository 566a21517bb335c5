//! Zone-scheduled greedy overlap optimizer.
//!
//! - [`zonestrategy`] – partition structures into distance zones around an origin
//! - [`agent`] – the trial loop: act, measure, keep or undo
pub mod agent;
pub mod zonestrategy;
