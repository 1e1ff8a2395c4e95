//! # Budgetmap - budget CSV to treemap JSON transformation
//!
//! Budgetmap ingests a flat tabular budget export and reshapes it into the
//! two-level category → line-item hierarchy consumed by a treemap renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│ Aggregator  │────▶│    JSON     │
//! │ (any enc.)  │     │ (auto-enc)  │     │ (2 levels)  │     │ (snapshot)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use budgetmap::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! let out = transform_csv(Path::new("budget.csv"), &TransformOptions::default()).unwrap();
//! println!("{} categories, {} total", out.tree.children.len(), out.tree.total_funding());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (BudgetTree, CategoryNode, LineItem, RowFormat)
//! - [`parser`] - CSV reading with encoding/delimiter auto-detection
//! - [`transform`] - Aggregation and pipeline orchestration

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregateError, AggregateResult, CsvError, CsvResult, PipelineError, PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{BudgetTree, CategoryNode, Entry, LineItem, RowFormat, DEFAULT_ROOT_LABEL};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_bytes_auto,
    parse_csv_file, parse_csv_file_auto, parse_records, ParseResult,
};

// =============================================================================
// Re-exports - Aggregation
// =============================================================================

pub use transform::grouper::{
    extract, is_valid_row, parse_funding, rows_to_tree, AggregateOutput, PLACEHOLDER_MARKER,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    transform_bytes, transform_csv, write_snapshot, CsvInfo, PipelineOutput, RunState,
    TransformOptions, Transformer,
};
