use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int32Type, Int64Type, Schema, UInt32Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use super::model::{
    Filing, FundStructure, FundType, PendingRequest, PendingRequestStatus, PendingRequestType,
    ReturnStatus,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// File extensions accepted by [`load_file`] and [`save_file`].
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["parquet", "pq", "json", "csv"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load filings from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per field (recommended for large exports)
/// * `.json`    – `[{ "id": "1", "entity_id": "101", ... }, ...]`
/// * `.csv`     – header row, flat columns, empty cells for absent values
///
/// Records are returned in file order. Invariant checks are left to the
/// caller.
pub fn load_file(path: &Path) -> Result<Vec<Filing>> {
    match extension_of(path).as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Write filings to a file in the format named by its extension.
pub fn save_file(path: &Path, filings: &[Filing]) -> Result<()> {
    match extension_of(path).as_str() {
        "parquet" | "pq" => save_parquet(path, filings),
        "json" => save_json(path, filings),
        "csv" => save_csv(path, filings),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Flat row – shared by CSV and Parquet
// ---------------------------------------------------------------------------

/// One filing with the pending request split into two nullable columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FilingRow {
    id: String,
    entity_id: String,
    fund_name: String,
    fund_type: FundType,
    fund_structure: Option<FundStructure>,
    parent_fund_name: Option<String>,
    period: String,
    period_description: String,
    due_date: String,
    due_date_description: String,
    status: ReturnStatus,
    extensions_used: u32,
    used_extension_days: u32,
    max_extensions: u32,
    extension_description: String,
    can_request_extension: bool,
    is_urgent: bool,
    pending_request_type: Option<PendingRequestType>,
    pending_request_status: Option<PendingRequestStatus>,
}

impl From<&Filing> for FilingRow {
    fn from(f: &Filing) -> Self {
        FilingRow {
            id: f.id.clone(),
            entity_id: f.entity_id.clone(),
            fund_name: f.fund_name.clone(),
            fund_type: f.fund_type,
            fund_structure: f.fund_structure,
            parent_fund_name: f.parent_fund_name.clone(),
            period: f.period.clone(),
            period_description: f.period_description.clone(),
            due_date: f.due_date.clone(),
            due_date_description: f.due_date_description.clone(),
            status: f.status,
            extensions_used: f.extensions_used,
            used_extension_days: f.used_extension_days,
            max_extensions: f.max_extensions,
            extension_description: f.extension_description.clone(),
            can_request_extension: f.can_request_extension,
            is_urgent: f.is_urgent,
            pending_request_type: f.pending_request.map(|p| p.kind),
            pending_request_status: f.pending_request.map(|p| p.status),
        }
    }
}

impl TryFrom<FilingRow> for Filing {
    type Error = anyhow::Error;

    fn try_from(row: FilingRow) -> Result<Self> {
        let pending_request = match (row.pending_request_type, row.pending_request_status) {
            (Some(kind), Some(status)) => Some(PendingRequest { kind, status }),
            (None, None) => None,
            _ => bail!(
                "filing {}: pending request type and status must be set together",
                row.id
            ),
        };
        Ok(Filing {
            id: row.id,
            entity_id: row.entity_id,
            fund_name: row.fund_name,
            fund_type: row.fund_type,
            fund_structure: row.fund_structure,
            parent_fund_name: row.parent_fund_name.filter(|s| !s.is_empty()),
            period: row.period,
            period_description: row.period_description,
            due_date: row.due_date,
            due_date_description: row.due_date_description,
            status: row.status,
            extensions_used: row.extensions_used,
            used_extension_days: row.used_extension_days,
            max_extensions: row.max_extensions,
            extension_description: row.extension_description,
            can_request_extension: row.can_request_extension,
            is_urgent: row.is_urgent,
            pending_request,
        })
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "id": "2",
///     "entity_id": "102",
///     "fund_name": "Technology Growth Fund",
///     "fund_type": "private",
///     "period": "FY 2024",
///     "status": "available",
///     "pending_request": { "kind": "extension", "status": "pending" },
///     ...
///   }
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Filing>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let filings: Vec<Filing> = serde_json::from_str(&text).context("parsing JSON")?;
    Ok(filings)
}

fn save_json(path: &Path, filings: &[Filing]) -> Result<()> {
    let file = File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, filings).context("writing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with the [`FilingRow`] field names.
/// Optional columns may be left empty.
fn load_csv(path: &Path) -> Result<Vec<Filing>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut filings = Vec::new();
    for (row_no, result) in reader.deserialize::<FilingRow>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        filings.push(Filing::try_from(row).with_context(|| format!("CSV row {row_no}"))?);
    }
    Ok(filings)
}

fn save_csv(path: &Path, filings: &[Filing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for filing in filings {
        writer
            .serialize(FilingRow::from(filing))
            .with_context(|| format!("writing filing {}", filing.id))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Load a Parquet file containing filings.
///
/// Expected schema:
/// - text fields: Utf8 or LargeUtf8 (`fund_structure`, `parent_fund_name`
///   and the two `pending_request_*` columns may be null or absent)
/// - `extensions_used`, `used_extension_days`, `max_extensions`: Int32,
///   Int64 or UInt32
/// - `can_request_extension`, `is_urgent`: Boolean
fn load_parquet(path: &Path) -> Result<Vec<Filing>> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut filings = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let filing = read_row(&batch, row)
                .and_then(Filing::try_from)
                .with_context(|| format!("Row {row}"))?;
            filings.push(filing);
        }
    }

    Ok(filings)
}

fn read_row(batch: &RecordBatch, row: usize) -> Result<FilingRow> {
    let text = |name: &str| -> Result<String> {
        optional_text(Some(required_column(batch, name)?), row)?
            .with_context(|| format!("null value in '{name}'"))
    };
    let maybe_text = |name: &str| -> Result<Option<String>> {
        optional_text(batch.column_by_name(name), row)
    };
    let count = |name: &str| -> Result<u32> { count_at(required_column(batch, name)?, row) };
    let flag = |name: &str| -> Result<bool> { flag_at(required_column(batch, name)?, row) };

    Ok(FilingRow {
        id: text("id")?,
        entity_id: text("entity_id")?,
        fund_name: text("fund_name")?,
        fund_type: text("fund_type")?.parse()?,
        fund_structure: maybe_text("fund_structure")?
            .map(|s| s.parse())
            .transpose()?,
        parent_fund_name: maybe_text("parent_fund_name")?,
        period: text("period")?,
        period_description: text("period_description")?,
        due_date: text("due_date")?,
        due_date_description: text("due_date_description")?,
        status: text("status")?.parse()?,
        extensions_used: count("extensions_used")?,
        used_extension_days: count("used_extension_days")?,
        max_extensions: count("max_extensions")?,
        extension_description: text("extension_description")?,
        can_request_extension: flag("can_request_extension")?,
        is_urgent: flag("is_urgent")?,
        pending_request_type: maybe_text("pending_request_type")?
            .map(|s| s.parse())
            .transpose()?,
        pending_request_status: maybe_text("pending_request_status")?
            .map(|s| s.parse())
            .transpose()?,
    })
}

// -- Arrow helpers --

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("Parquet file missing '{name}' column"))
}

/// String cell, `None` when the column is absent or the cell is null.
fn optional_text(col: Option<&ArrayRef>, row: usize) -> Result<Option<String>> {
    let Some(col) = col else {
        return Ok(None);
    };
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        other => bail!("Expected Utf8 column, got {other:?}"),
    };
    Ok(Some(value.to_string()))
}

fn count_at(col: &ArrayRef, row: usize) -> Result<u32> {
    if col.is_null(row) {
        bail!("null value in counter column");
    }
    let value: i64 = match col.data_type() {
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as i64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row),
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row) as i64,
        other => bail!("Expected integer counter column, got {other:?}"),
    };
    u32::try_from(value).with_context(|| format!("counter value {value} out of range"))
}

fn flag_at(col: &ArrayRef, row: usize) -> Result<bool> {
    if col.is_null(row) {
        bail!("null value in flag column");
    }
    match col.data_type() {
        DataType::Boolean => Ok(col.as_boolean().value(row)),
        other => bail!("Expected Boolean flag column, got {other:?}"),
    }
}

/// Build a single Arrow batch holding `filings`, one column per field.
pub fn filings_to_batch(filings: &[Filing]) -> Result<RecordBatch> {
    fn text<F: Fn(&Filing) -> &str>(filings: &[Filing], get: F) -> ArrayRef {
        Arc::new(StringArray::from(filings.iter().map(get).collect::<Vec<_>>()))
    }
    fn maybe_text<F: Fn(&Filing) -> Option<&str>>(filings: &[Filing], get: F) -> ArrayRef {
        Arc::new(StringArray::from(filings.iter().map(get).collect::<Vec<_>>()))
    }
    fn count<F: Fn(&Filing) -> u32>(filings: &[Filing], get: F) -> ArrayRef {
        Arc::new(Int64Array::from(
            filings.iter().map(|f| get(f) as i64).collect::<Vec<_>>(),
        ))
    }
    fn flag<F: Fn(&Filing) -> bool>(filings: &[Filing], get: F) -> ArrayRef {
        Arc::new(BooleanArray::from(filings.iter().map(get).collect::<Vec<_>>()))
    }

    let utf8 = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);
    let schema = Arc::new(Schema::new(vec![
        utf8("id", false),
        utf8("entity_id", false),
        utf8("fund_name", false),
        utf8("fund_type", false),
        utf8("fund_structure", true),
        utf8("parent_fund_name", true),
        utf8("period", false),
        utf8("period_description", false),
        utf8("due_date", false),
        utf8("due_date_description", false),
        utf8("status", false),
        Field::new("extensions_used", DataType::Int64, false),
        Field::new("used_extension_days", DataType::Int64, false),
        Field::new("max_extensions", DataType::Int64, false),
        utf8("extension_description", false),
        Field::new("can_request_extension", DataType::Boolean, false),
        Field::new("is_urgent", DataType::Boolean, false),
        utf8("pending_request_type", true),
        utf8("pending_request_status", true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        text(filings, |f| &f.id),
        text(filings, |f| &f.entity_id),
        text(filings, |f| &f.fund_name),
        text(filings, |f| f.fund_type.as_str()),
        maybe_text(filings, |f| f.fund_structure.map(|s| s.as_str())),
        maybe_text(filings, |f| f.parent_fund_name.as_deref()),
        text(filings, |f| &f.period),
        text(filings, |f| &f.period_description),
        text(filings, |f| &f.due_date),
        text(filings, |f| &f.due_date_description),
        text(filings, |f| f.status.as_str()),
        count(filings, |f| f.extensions_used),
        count(filings, |f| f.used_extension_days),
        count(filings, |f| f.max_extensions),
        text(filings, |f| &f.extension_description),
        flag(filings, |f| f.can_request_extension),
        flag(filings, |f| f.is_urgent),
        maybe_text(filings, |f| f.pending_request.map(|p| p.kind.as_str())),
        maybe_text(filings, |f| f.pending_request.map(|p| p.status.as_str())),
    ];

    RecordBatch::try_new(schema, columns).context("building filings record batch")
}

fn save_parquet(path: &Path, filings: &[Filing]) -> Result<()> {
    let batch = filings_to_batch(filings)?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::seed_filings;

    fn round_trip(extension: &str) -> Vec<Filing> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("filings.{extension}"));
        save_file(&path, &seed_filings()).unwrap();
        load_file(&path).unwrap()
    }

    #[test]
    fn json_file_reloads_seed_records() {
        assert_eq!(round_trip("json"), seed_filings());
    }

    #[test]
    fn csv_file_reloads_seed_records() {
        assert_eq!(round_trip("csv"), seed_filings());
    }

    #[test]
    fn parquet_file_reloads_seed_records() {
        assert_eq!(round_trip("parquet"), seed_filings());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("filings.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn csv_with_half_a_pending_request_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filings.csv");
        save_file(&path, &seed_filings()[..1]).unwrap();

        // Fill in only the pending request type on the single data row.
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        let row = lines[1].clone();
        let trimmed = row.strip_suffix(",").unwrap_or(&row);
        lines[1] = format!("{trimmed}extension,");
        std::fs::write(&path, lines.join("\n")).unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("must be set together"));
    }

    #[test]
    fn batch_has_one_row_per_filing() {
        let batch = filings_to_batch(&seed_filings()).unwrap();
        assert_eq!(batch.num_rows(), 12);
        assert_eq!(batch.num_columns(), 19);
    }
}
