//! Budgetmap CLI - Transform a budget CSV export into treemap JSON
//!
//! ```bash
//! budgetmap --in budget.csv --out data/budgets.json
//! budgetmap --in budget.csv --out out.json --label "FY2018 Budget" --pretty
//! ```

use budgetmap::{PipelineError, RowFormat, TransformOptions, Transformer};
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "budgetmap")]
#[command(about = "Transform a flat budget CSV export into treemap JSON", long_about = None)]
struct Cli {
    /// Input CSV file
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,

    /// Output JSON file
    #[arg(long = "out", value_name = "PATH")]
    output: PathBuf,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Root label of the emitted tree
    #[arg(short, long)]
    label: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    eprintln!("📄 Reading budget export: {}", cli.input.display());

    let options = TransformOptions {
        delimiter: cli.delimiter,
        label: cli.label,
        format: RowFormat::default(),
        pretty: cli.pretty,
    };

    let mut transformer = Transformer::from_path(&cli.input, options)?;

    {
        let out = transformer.run()?;
        eprintln!("   Encoding: {}", out.csv_info.encoding);
        eprintln!(
            "   Delimiter: '{}'{}",
            format_delimiter(out.csv_info.delimiter),
            if cli.delimiter.is_none() {
                " (auto-detected)"
            } else {
                ""
            }
        );
        eprintln!("   Rows: {}", out.csv_info.row_count);
        eprintln!(
            "✅ Aggregated {} items into {} categories ({} rows skipped)",
            out.inserted,
            out.tree.children.len(),
            out.skipped
        );
        eprintln!("   Total funding: {}", out.tree.total_funding());
    }

    transformer.save(&cli.output)?;
    eprintln!("💾 Output written to: {}", cli.output.display());

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
