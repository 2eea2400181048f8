use std::path::Path;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;

use filings_dashboard::data::loader::{filings_to_batch, save_file};
use filings_dashboard::data::model::validate_records;
use filings_dashboard::data::seed::seed_filings;

const OUTPUTS: [&str; 3] = [
    "sample_filings.parquet",
    "sample_filings.json",
    "sample_filings.csv",
];

fn main() -> Result<()> {
    env_logger::init();

    let filings = seed_filings();
    validate_records(&filings).context("seed dataset is inconsistent")?;

    for output in OUTPUTS {
        save_file(Path::new(output), &filings).with_context(|| format!("writing {output}"))?;
        log::info!("Wrote {} filings to {output}", filings.len());
    }

    // Preview the first few rows, narrowed to the columns people scan for.
    let batch = filings_to_batch(&filings[..filings.len().min(5)])?;
    let preview = batch.project(&[0, 1, 2, 3, 6, 10])?;
    println!("{}", pretty_format_batches(&[preview])?);

    println!("Wrote {} filings to {}", filings.len(), OUTPUTS.join(", "));
    Ok(())
}
