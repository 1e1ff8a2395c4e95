//! Transformation module.
//!
//! This module handles CSV to budget-tree transformation:
//! - Grouper: flat rows to the two-level category tree
//! - Pipeline: orchestration, one-shot transformer, and snapshot output

pub mod grouper;
pub mod pipeline;

pub use grouper::rows_to_tree;
pub use pipeline::*;
