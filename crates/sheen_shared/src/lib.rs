//! Shared functionality
//!
//! This crate supplies the small building blocks shared by the sheen css crates: source
//! locations, fixed-point numbers and the interned string table.

pub mod fixed;
pub mod intern;
pub mod location;
