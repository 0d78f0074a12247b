use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Record, TimeSeriesDataset};

/// Date layouts accepted for the date column, tried in order. `%y` comes
/// before `%Y` so that `1/2/06` is not read as year 6.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a time-series dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (recommended)
/// * `.json`    – `[{ "Date": "2024-01-02", "metric": 1.5, ... }, ...]`
/// * `.parquet` – flat columns; the date column may be Utf8 or Date32
///
/// Every record must carry a parseable value in `date_column`.
pub fn load_file(path: &Path, date_column: &str) -> Result<TimeSeriesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv_reader(file, date_column)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text, date_column)?
        }
        "parquet" | "pq" => load_parquet(path, date_column)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::debug!(
        "{}: {} records, {} metrics",
        path.display(),
        dataset.len(),
        dataset.columns.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse a date cell. Quotes and surrounding whitespace are ignored, and a
/// datetime (`2024-01-02 16:00:00`, RFC 3339) is reduced to its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; one column holds dates, every
/// other column is a metric. Short rows are padded with nulls.
pub fn load_csv_reader<R: Read>(reader: R, date_column: &str) -> Result<TimeSeriesDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| h == date_column)
        .with_context(|| format!("CSV missing date column '{date_column}'"))?;

    let metric_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        // 1-based file line, header included
        let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).with_context(|| {
            format!("CSV line {line}: cannot parse '{raw_date}' in column '{date_column}'")
        })?;

        let values = metric_cols
            .iter()
            .map(|(idx, name)| {
                let cell = record.get(*idx).map(guess_cell_type).unwrap_or(CellValue::Null);
                (name.clone(), cell)
            })
            .collect();

        records.push(Record { date, values });
    }

    let columns = metric_cols.into_iter().map(|(_, name)| name).collect();
    Ok(TimeSeriesDataset::new(date_column, columns, records))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Some(v) = parse_number(s) {
        return v;
    }
    // "1,234.5" style thousands separators
    if s.contains(',') {
        if let Some(v) = parse_number(&s.replace(',', "")) {
            return v;
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if let Some(d) = parse_date(s) {
        return CellValue::Date(d);
    }
    CellValue::String(s.to_string())
}

fn parse_number(s: &str) -> Option<CellValue> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(CellValue::Integer(i));
    }
    s.parse::<f64>().ok().map(CellValue::Float)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2024-01-02", "USDJPYEXClose": 141.2, "SP500": 4742.8 },
///   ...
/// ]
/// ```
///
/// Metric columns are taken from the first record.
pub fn parse_json(text: &str, date_column: &str) -> Result<TimeSeriesDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let columns: Vec<String> = match rows.first().and_then(|r| r.as_object()) {
        Some(obj) => obj.keys().filter(|k| *k != date_column).cloned().collect(),
        None => Vec::new(),
    };

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let date = obj
            .get(date_column)
            .and_then(|v| v.as_str())
            .and_then(parse_date)
            .with_context(|| format!("Row {i}: missing or invalid '{date_column}'"))?;

        let values = columns
            .iter()
            .map(|col| {
                let cell = obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null);
                (col.clone(), cell)
            })
            .collect::<BTreeMap<_, _>>();

        records.push(Record { date, values });
    }

    Ok(TimeSeriesDataset::new(date_column, columns, records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s.trim()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per metric.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). The date column may be stored as
/// text or as `Date32`.
fn load_parquet(path: &Path, date_column: &str) -> Result<TimeSeriesDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let date_idx = schema
        .index_of(date_column)
        .map_err(|_| anyhow::anyhow!("Parquet file missing date column '{date_column}'"))?;
    let metric_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, f)| (i, f.name().clone()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let date_col = batch.column(date_idx);

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let date = extract_date(date_col, row).with_context(|| {
                format!("Row {row_no}: missing or invalid '{date_column}'")
            })?;

            let values = metric_cols
                .iter()
                .map(|(col_idx, name)| (name.clone(), extract_cell_value(batch.column(*col_idx), row)))
                .collect();

            records.push(Record { date, values });
        }
    }

    let columns = metric_cols.into_iter().map(|(_, name)| name).collect();
    Ok(TimeSeriesDataset::new(date_column, columns, records))
}

// -- Parquet / Arrow helpers --

fn extract_date(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDate> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Date32 => col.as_primitive::<Date32Type>().value_as_date(row),
        DataType::Utf8 => parse_date(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => parse_date(col.as_string::<i64>().value(row)),
        _ => None,
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => guess_cell_type(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => guess_cell_type(col.as_string::<i64>().value(row)),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::date;

    const PLATO_CSV: &str = "\
Date,USDJPYEXClose,SP500,Note
2024-01-02,141.2,\"4,742.83\",open
2024-01-03,142.1,\"4,704.81\",

2024-1-4,143.5,4688.68,close
";

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2006-1-2"), Some(date(2006, 1, 2)));
        assert_eq!(parse_date("1/2/06"), Some(date(2006, 1, 2)));
        assert_eq!(parse_date("1/2/2006"), Some(date(2006, 1, 2)));
        assert_eq!(parse_date(" \"2024-03-15\" "), Some(date(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15 16:00:00"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T16:00:00Z"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_csv_loads_metrics_in_header_order() {
        let ds = load_csv_reader(PLATO_CSV.as_bytes(), "Date").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.columns, vec!["USDJPYEXClose", "SP500", "Note"]);
        assert_eq!(ds.date_column, "Date");
        assert_eq!(ds.records[2].date, date(2024, 1, 4));
    }

    #[test]
    fn test_csv_thousands_separator_and_nulls() {
        let ds = load_csv_reader(PLATO_CSV.as_bytes(), "Date").unwrap();
        assert_eq!(ds.records[0].values["SP500"], CellValue::Float(4742.83));
        assert_eq!(ds.records[1].values["Note"], CellValue::Null);
        assert_eq!(ds.records[0].values["Note"], CellValue::String("open".into()));
    }

    #[test]
    fn test_csv_missing_date_column() {
        let err = load_csv_reader("Day,x\n2024-01-01,1\n".as_bytes(), "Date").unwrap_err();
        assert!(format!("{err:#}").contains("missing date column"));
    }

    #[test]
    fn test_csv_unparseable_date_names_file_line() {
        let text = "Date,x\n2024-01-01,1\nnot-a-date,2\n";
        let err = load_csv_reader(text.as_bytes(), "Date").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("not-a-date"), "{msg}");
    }

    #[test]
    fn test_csv_short_row_padded() {
        let ds = load_csv_reader("Date,x,y\n2024-01-01,1\n".as_bytes(), "Date").unwrap();
        assert_eq!(ds.records[0].values["y"], CellValue::Null);
    }

    #[test]
    fn test_json_records() {
        let text = r#"[
            {"Date": "2024-01-02", "a": 1, "b": 2.5},
            {"Date": "1/3/2024", "a": null, "b": "3,000"}
        ]"#;
        let ds = parse_json(text, "Date").unwrap();
        assert_eq!(ds.columns, vec!["a", "b"]);
        assert_eq!(ds.records[1].date, date(2024, 1, 3));
        assert_eq!(ds.records[0].values["a"], CellValue::Integer(1));
        assert_eq!(ds.records[1].values["a"], CellValue::Null);
        assert_eq!(ds.records[1].values["b"], CellValue::Integer(3000));
    }

    #[test]
    fn test_json_rejects_missing_date() {
        let err = parse_json(r#"[{"a": 1}]"#, "Date").unwrap_err();
        assert!(format!("{err:#}").contains("Row 0"));
    }

    #[test]
    fn test_parquet_round_trip_through_file() {
        use arrow::array::{Date32Array, Float64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let epoch = date(1970, 1, 1);
        let days: Vec<i32> = [date(2024, 1, 2), date(2024, 1, 3)]
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Date32, false),
            Field::new("close", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(days)),
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("corrview-test-{}.parquet", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path, "Date").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.columns, vec!["close"]);
        assert_eq!(ds.records[0].date, date(2024, 1, 2));
        assert_eq!(ds.records[0].values["close"], CellValue::Float(1.5));
        assert_eq!(ds.records[1].values["close"], CellValue::Null);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("data.xlsx"), "Date").unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
