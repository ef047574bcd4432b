#![warn(missing_docs)]
//! Core types and utilities for `cellpath`.
//!
//! This crate provides the integer cost arithmetic, the open list and the graph interface shared
//! by the grid and search crates.

mod cost;
mod pqueue;
pub mod traits;

pub use crate::cost::*;
pub use crate::pqueue::*;
