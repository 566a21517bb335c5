//! Event types and observers used by the backend.
//!
//! Submodules:
//! - [`contact`] – contact notifications emitted by the contact detector
pub mod contact;
