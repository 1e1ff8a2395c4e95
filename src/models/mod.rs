//! Domain models for the budgetmap pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RowFormat`] - Positional column schema of the budget export
//! - [`Entry`] - Projection of one row through the schema
//! - [`BudgetTree`] - The rooted two-level output tree
//! - [`CategoryNode`] - One node per distinct category, first-seen order
//! - [`LineItem`] - A single funded line entry, leaf of the tree

use serde::{Deserialize, Serialize};

/// Root label used when none is supplied.
pub const DEFAULT_ROOT_LABEL: &str = "2017 Operating Budget";

// =============================================================================
// Row Schema
// =============================================================================

/// Positional column schema of the budget export.
///
/// The export carries many columns; only three are consulted. Defaults match
/// the municipal operating-budget layout (category in the first column, the
/// line-item name and funding amount near the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFormat {
    /// Column holding the category grouping key.
    pub category: usize,
    /// Column holding the line-item name.
    pub name: usize,
    /// Column holding the funding amount (formatted numeric string).
    pub funding: usize,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self {
            category: 0,
            name: 7,
            funding: 8,
        }
    }
}

// =============================================================================
// Entry
// =============================================================================

/// The projection of one raw row through [`RowFormat`].
///
/// Funding is still the raw formatted string here (e.g. `"1,200"`); it is
/// parsed to an integer on insertion into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub category: String,
    pub name: String,
    pub funding: String,
}

// =============================================================================
// Budget Tree
// =============================================================================

/// A single funded line entry, leaf of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line-item name.
    pub name: String,
    /// Funding as a plain non-negative integer (separators stripped).
    pub funding: u64,
}

/// One tree node per distinct category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Category name, unique among the root's children.
    pub name: String,
    /// Line items in input order.
    pub children: Vec<LineItem>,
}

impl CategoryNode {
    /// Create an empty category node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// The rooted, exactly-two-level budget tree.
///
/// This is the final output shape. The downstream treemap renderer requires
/// `children` arrays present (possibly empty) and `funding` as a plain
/// integer, which the serde derives guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTree {
    /// Constant root label.
    pub name: String,
    /// Categories in first-seen order.
    pub children: Vec<CategoryNode>,
}

impl BudgetTree {
    /// Create an empty tree with the given root label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            name: label.into(),
            children: Vec::new(),
        }
    }

    /// Number of line items across all categories.
    pub fn item_count(&self) -> usize {
        self.children.iter().map(|c| c.children.len()).sum()
    }

    /// Sum of funding across all line items.
    pub fn total_funding(&self) -> u64 {
        self.children
            .iter()
            .flat_map(|c| &c.children)
            .map(|item| item.funding)
            .sum()
    }
}

// =============================================================================
// Tests
// =============================================================================
