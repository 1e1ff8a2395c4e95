//! Aggregate flat budget rows into the two-level category tree.
//!
//! This is the core of the pipeline: a single ordered pass that filters
//! noise rows, projects the schema columns, and groups line items under
//! their category.
//!
//! ```text
//! CSV Input (flat rows)             →  Tree Output
//! ┌──────────────────────────────┐     ┌──────────────────────────┐
//! │ Police, …, Patrol,     1,200 │     │ Police                   │
//! │ Police, …, Detectives,   300 │  →  │   Patrol 1200, Det. 300  │
//! │ Fire,   …, Suppression,   50 │     ├──────────────────────────┤
//! └──────────────────────────────┘     │ Fire                     │
//!                                      │   Suppression 50         │
//!                                      └──────────────────────────┘
//! ```
//!
//! Categories appear in first-seen order; items keep input order. Sentinel
//! rows (no trailing value) and placeholder rows (`textbox…` category) are
//! expected export noise and are skipped silently. A funding field that is
//! not numeric after separator stripping aborts the run.

use std::collections::HashMap;

use crate::error::{AggregateError, AggregateResult};
use crate::models::{BudgetTree, CategoryNode, Entry, LineItem, RowFormat};

/// Reserved substring marking non-data rows.
///
/// SSRS-style report exports name their layout cells `textbox…`, and those
/// names leak into the category column of header and annotation rows.
pub const PLACEHOLDER_MARKER: &str = "textbox";

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregateOutput {
    /// The finished tree.
    pub tree: BudgetTree,
    /// Number of line items inserted.
    pub inserted: usize,
    /// Number of rows skipped as sentinel/placeholder noise.
    pub skipped: usize,
}

/// Check whether a row carries budget data.
///
/// `width` is the header width. A row whose trailing field (at the header's
/// last position) is absent or empty is a sentinel/footer row; a row whose
/// category field contains [`PLACEHOLDER_MARKER`] is layout noise. Both are
/// skipped, exact case-sensitive matching throughout.
pub fn is_valid_row(row: &[String], width: usize) -> bool {
    if width == 0 {
        return false;
    }
    let has_trailing = row.get(width - 1).is_some_and(|v| !v.is_empty());
    let placeholder = row
        .first()
        .is_some_and(|c| c.contains(PLACEHOLDER_MARKER));
    has_trailing && !placeholder
}

/// Project the schema columns out of a raw row.
///
/// `row_number` is the 1-based data row position, used for error context.
pub fn extract(row: &[String], format: &RowFormat, row_number: usize) -> AggregateResult<Entry> {
    let field = |column: usize| -> AggregateResult<String> {
        row.get(column)
            .cloned()
            .ok_or(AggregateError::MissingColumn {
                row: row_number,
                column,
            })
    };

    Ok(Entry {
        category: field(format.category)?,
        name: field(format.name)?,
        funding: field(format.funding)?,
    })
}

/// Parse a formatted funding string into a plain integer.
///
/// Strips every comma, then parses base-10. Anything left over (currency
/// symbols, decimals, empty string) is a hard error rather than a silent
/// zero.
pub fn parse_funding(raw: &str, row_number: usize) -> AggregateResult<u64> {
    let stripped: String = raw.chars().filter(|c| *c != ',').collect();
    stripped
        .parse::<u64>()
        .map_err(|_| AggregateError::FundingParse {
            row: row_number,
            value: raw.to_string(),
        })
}

/// Run the aggregation pass over all rows.
pub fn rows_to_tree(
    rows: &[Vec<String>],
    width: usize,
    format: &RowFormat,
    label: &str,
) -> AggregateResult<AggregateOutput> {
    let mut builder = TreeBuilder::new(label);
    let mut skipped = 0;

    for (i, row) in rows.iter().enumerate() {
        let row_number = i + 1;
        if !is_valid_row(row, width) {
            skipped += 1;
            continue;
        }
        let entry = extract(row, format, row_number)?;
        builder.insert(&entry, row_number)?;
    }

    Ok(AggregateOutput {
        inserted: builder.inserted,
        tree: builder.tree,
        skipped,
    })
}

/// Builder accumulating line items while grouping by category.
///
/// Categories are materialized lazily: a name→index map gives the lookup,
/// the tree's child vector keeps first-seen order.
struct TreeBuilder {
    tree: BudgetTree,
    index: HashMap<String, usize>,
    inserted: usize,
}

impl TreeBuilder {
    fn new(label: &str) -> Self {
        Self {
            tree: BudgetTree::new(label),
            index: HashMap::new(),
            inserted: 0,
        }
    }

    fn insert(&mut self, entry: &Entry, row_number: usize) -> AggregateResult<()> {
        let funding = parse_funding(&entry.funding, row_number)?;
        self.category_mut(&entry.category).children.push(LineItem {
            name: entry.name.clone(),
            funding,
        });
        self.inserted += 1;
        Ok(())
    }

    /// Find-or-create the category node, exact case-sensitive match.
    fn category_mut(&mut self, name: &str) -> &mut CategoryNode {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                let position = self.tree.children.len();
                self.tree.children.push(CategoryNode::new(name));
                self.index.insert(name.to_string(), position);
                position
            }
        };
        &mut self.tree.children[position]
    }
}
