//! High-level pipeline API: parse → aggregate → JSON snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use budgetmap::{transform_csv, TransformOptions};
//! use std::path::Path;
//!
//! let out = transform_csv(Path::new("budget.csv"), &TransformOptions::default())?;
//! println!("{} categories", out.tree.children.len());
//! ```

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::grouper::rows_to_tree;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{BudgetTree, RowFormat, DEFAULT_ROOT_LABEL};
use crate::parser::{parse_bytes, parse_bytes_auto, parse_csv_file, parse_csv_file_auto, ParseResult};

/// Options for the transformation pipeline
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// CSV delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,

    /// Root label of the emitted tree
    pub label: Option<String>,

    /// Positional column schema
    pub format: RowFormat,

    /// Pretty-print the JSON snapshot
    pub pretty: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            label: None,
            format: RowFormat::default(),
            pretty: false,
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete transformation run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// The aggregated budget tree
    pub tree: BudgetTree,

    /// CSV parsing metadata
    pub csv_info: CsvInfo,

    /// Number of line items inserted
    pub inserted: usize,

    /// Number of rows skipped as sentinel/placeholder noise
    pub skipped: usize,
}

/// Transform a budget CSV file into the category tree.
///
/// Parses with encoding/delimiter auto-detection (unless the options pin a
/// delimiter), then runs the aggregation pass.
pub fn transform_csv(path: &Path, options: &TransformOptions) -> PipelineResult<PipelineOutput> {
    let parsed = match options.delimiter {
        Some(delimiter) => parse_csv_file(path, delimiter)?,
        None => parse_csv_file_auto(path)?,
    };
    transform_parsed(&parsed, options)
}

/// Transform raw CSV bytes into the category tree.
pub fn transform_bytes(bytes: &[u8], options: &TransformOptions) -> PipelineResult<PipelineOutput> {
    let parsed = match options.delimiter {
        Some(delimiter) => parse_bytes(bytes, delimiter)?,
        None => parse_bytes_auto(bytes)?,
    };
    transform_parsed(&parsed, options)
}

fn transform_parsed(
    parsed: &ParseResult,
    options: &TransformOptions,
) -> PipelineResult<PipelineOutput> {
    let label = options.label.as_deref().unwrap_or(DEFAULT_ROOT_LABEL);
    let aggregated = rows_to_tree(&parsed.rows, parsed.headers.len(), &options.format, label)?;

    Ok(PipelineOutput {
        tree: aggregated.tree,
        csv_info: CsvInfo {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.rows.len(),
        },
        inserted: aggregated.inserted,
        skipped: aggregated.skipped,
    })
}

/// Serialize the tree and write it to `path` atomically.
///
/// The JSON is staged in a temp file in the destination directory and
/// renamed into place; a failed run leaves no partial output behind.
pub fn write_snapshot(tree: &BudgetTree, path: &Path, pretty: bool) -> PipelineResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(json.as_bytes())?;
    staged.persist(path).map_err(|e| PipelineError::Io(e.error))?;
    Ok(())
}

// =============================================================================
// One-Shot Transformer
// =============================================================================

/// Whether a [`Transformer`] has produced its tree yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Completed,
}

/// One-shot transform over a parsed budget export.
///
/// Holds the materialized input and runs the aggregation at most once; the
/// result is cached and [`Transformer::save`] reuses it. [`Transformer::output`]
/// reports [`PipelineError::NotRun`] if consulted before the run.
#[derive(Debug)]
pub struct Transformer {
    parsed: ParseResult,
    options: TransformOptions,
    state: RunState,
    output: Option<PipelineOutput>,
}

impl Transformer {
    /// Read and parse the input file, ready to run.
    pub fn from_path(path: &Path, options: TransformOptions) -> PipelineResult<Self> {
        let parsed = match options.delimiter {
            Some(delimiter) => parse_csv_file(path, delimiter)?,
            None => parse_csv_file_auto(path)?,
        };
        Ok(Self::from_parsed(parsed, options))
    }

    /// Parse raw CSV bytes, ready to run.
    pub fn from_bytes(bytes: &[u8], options: TransformOptions) -> PipelineResult<Self> {
        let parsed = match options.delimiter {
            Some(delimiter) => parse_bytes(bytes, delimiter)?,
            None => parse_bytes_auto(bytes)?,
        };
        Ok(Self::from_parsed(parsed, options))
    }

    fn from_parsed(parsed: ParseResult, options: TransformOptions) -> Self {
        Self {
            parsed,
            options,
            state: RunState::NotStarted,
            output: None,
        }
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the aggregation, or return the cached result of the first run.
    pub fn run(&mut self) -> PipelineResult<&PipelineOutput> {
        if self.output.is_none() {
            let output = transform_parsed(&self.parsed, &self.options)?;
            self.output = Some(output);
            self.state = RunState::Completed;
        }
        self.output.as_ref().ok_or(PipelineError::NotRun)
    }

    /// The completed run's output, without triggering a run.
    pub fn output(&self) -> PipelineResult<&PipelineOutput> {
        self.output.as_ref().ok_or(PipelineError::NotRun)
    }

    /// Write the JSON snapshot to `path`, running first if needed.
    pub fn save(&mut self, path: &Path) -> PipelineResult<()> {
        self.run()?;
        let output = self.output()?;
        write_snapshot(&output.tree, path, self.options.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryNode;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
Agency,Col1,Col2,Col3,Col4,Col5,Col6,Service,Funding
Police,a,b,c,d,e,f,Patrol,\"1,200\"
Police,a,b,c,d,e,f,Detectives,300
Fire,a,b,c,d,e,f,Suppression,50
textbox12,a,b,c,d,e,f,Note,10
Total,,,,,,,,
";

    #[test]
    fn test_default_options() {
        let options = TransformOptions::default();
        assert!(options.delimiter.is_none());
        assert!(options.label.is_none());
        assert!(!options.pretty);
        assert_eq!(options.format, RowFormat::default());
    }

    #[test]
    fn test_transform_bytes_end_to_end() {
        let out = transform_bytes(SAMPLE.as_bytes(), &TransformOptions::default()).unwrap();

        assert_eq!(out.csv_info.delimiter, ',');
        assert_eq!(out.csv_info.row_count, 5);
        assert_eq!(out.inserted, 3);
        assert_eq!(out.skipped, 2);

        assert_eq!(out.tree.name, DEFAULT_ROOT_LABEL);
        assert_eq!(out.tree.children.len(), 2);
        assert_eq!(out.tree.children[0].name, "Police");
        assert_eq!(out.tree.children[0].children[0].funding, 1200);
        assert_eq!(out.tree.children[1].name, "Fire");
        assert_eq!(out.tree.total_funding(), 1550);
    }

    #[test]
    fn test_label_override() {
        let options = TransformOptions {
            label: Some("FY2018 Budget".into()),
            ..TransformOptions::default()
        };
        let out = transform_bytes(SAMPLE.as_bytes(), &options).unwrap();
        assert_eq!(out.tree.name, "FY2018 Budget");
    }

    #[test]
    fn test_header_only_input_is_legal() {
        let csv = "Agency,Col1,Col2,Col3,Col4,Col5,Col6,Service,Funding\n";
        let out = transform_bytes(csv.as_bytes(), &TransformOptions::default()).unwrap();
        assert!(out.tree.children.is_empty());
        assert_eq!(out.inserted, 0);
    }

    #[test]
    fn test_transform_csv_from_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("budget.csv");
        fs::write(&input, SAMPLE).unwrap();

        let out = transform_csv(&input, &TransformOptions::default()).unwrap();
        assert_eq!(out.tree.children.len(), 2);
    }

    #[test]
    fn test_missing_input_file() {
        let result = transform_csv(
            Path::new("/nonexistent/budget.csv"),
            &TransformOptions::default(),
        );
        assert!(matches!(result, Err(PipelineError::Csv(_))));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("budgets.json");

        let out = transform_bytes(SAMPLE.as_bytes(), &TransformOptions::default()).unwrap();
        write_snapshot(&out.tree, &dest, false).unwrap();

        let written = fs::read_to_string(&dest).unwrap();
        let back: BudgetTree = serde_json::from_str(&written).unwrap();
        assert_eq!(back, out.tree);
    }

    #[test]
    fn test_snapshot_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("budgets.json");
        fs::write(&dest, "stale content").unwrap();

        let tree = BudgetTree::new("Budget");
        write_snapshot(&tree, &dest, false).unwrap();

        let written = fs::read_to_string(&dest).unwrap();
        assert_eq!(written, "{\"name\":\"Budget\",\"children\":[]}");
    }

    #[test]
    fn test_snapshot_pretty() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("budgets.json");

        let mut tree = BudgetTree::new("Budget");
        tree.children.push(CategoryNode::new("Police"));
        write_snapshot(&tree, &dest, true).unwrap();

        let written = fs::read_to_string(&dest).unwrap();
        assert!(written.contains('\n'));
        let back: BudgetTree = serde_json::from_str(&written).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_transformer_one_shot() {
        let mut transformer =
            Transformer::from_bytes(SAMPLE.as_bytes(), TransformOptions::default()).unwrap();
        assert_eq!(transformer.state(), RunState::NotStarted);
        assert!(matches!(
            transformer.output(),
            Err(PipelineError::NotRun)
        ));

        let first = transformer.run().unwrap().tree.clone();
        assert_eq!(transformer.state(), RunState::Completed);

        let second = transformer.run().unwrap().tree.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transformer_save_runs_if_needed() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("budgets.json");

        let mut transformer =
            Transformer::from_bytes(SAMPLE.as_bytes(), TransformOptions::default()).unwrap();
        transformer.save(&dest).unwrap();

        assert_eq!(transformer.state(), RunState::Completed);
        let back: BudgetTree = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(back.children.len(), 2);
    }

    #[test]
    fn test_malformed_funding_aborts_without_output() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("budgets.json");

        let csv = "\
Agency,Col1,Col2,Col3,Col4,Col5,Col6,Service,Funding
Police,a,b,c,d,e,f,Patrol,$500
";
        let mut transformer =
            Transformer::from_bytes(csv.as_bytes(), TransformOptions::default()).unwrap();
        let result = transformer.save(&dest);

        assert!(matches!(result, Err(PipelineError::Aggregate(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_determinism_across_runs() {
        let options = TransformOptions::default();
        let first = transform_bytes(SAMPLE.as_bytes(), &options).unwrap();
        let second = transform_bytes(SAMPLE.as_bytes(), &options).unwrap();
        assert_eq!(
            serde_json::to_string(&first.tree).unwrap(),
            serde_json::to_string(&second.tree).unwrap()
        );
    }
}
