use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::DataError;
use super::model::{Article, CellValue, Field, RecordStore};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an article dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "ID": 1, "Ano": 2021, ... }, ...]` or pandas' column
///   layout `{ "ID": { "0": 1, ... }, "Ano": { "0": 2021, ... }, ... }`
/// * `.csv`     – header row naming the fields, one article per line
/// * `.parquet` – one column per field (string, integer, float or bool)
///
/// Column names are matched against [`Field::aliases`].
pub fn load_file(path: &Path) -> Result<RecordStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let articles = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let store = RecordStore::from_articles(articles)
        .with_context(|| format!("indexing {}", path.display()))?;
    log::info!(
        "Loaded {} articles from {} (years {}–{}, {} classifications, {} evaluation areas)",
        store.len(),
        path.display(),
        store.year_bounds.0,
        store.year_bounds.1,
        store.classifications.len(),
        store.evaluation_areas.len(),
    );
    Ok(store)
}

/// Fail with [`DataError::MissingColumn`] for the first required field that
/// has no column.
fn check_columns<S: AsRef<str>>(headers: &[S]) -> Result<(), DataError> {
    match Field::ALL
        .into_iter()
        .find(|f| f.is_required() && f.position(headers).is_none())
    {
        Some(missing) => Err(DataError::MissingColumn(missing)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two JSON layouts are accepted.
///
/// Records (`df.to_json(orient='records')`), one object per article:
///
/// ```json
/// [
///   {
///     "ID": 1,
///     "Ano": 2021,
///     "Classificação": "A1",
///     "Área de Avaliação": "Engenharias",
///     "Área Específica": "Robótica",
///     "Fator de Impacto": 3.2,
///     "Internacionalização": "Sim"
///   },
///   ...
/// ]
/// ```
///
/// Columns (`df.to_json()`, pandas' default `orient='columns'`), one object
/// per column keyed by row index:
///
/// ```json
/// {
///   "ID": {"0": 1, "1": 2},
///   "Ano": {"0": 2021, "1": 2022},
///   ...
/// }
/// ```
fn load_json(path: &Path) -> Result<Vec<Article>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Vec<Article>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    match &root {
        JsonValue::Array(records) => parse_json_records(records),
        JsonValue::Object(columns) if columns.values().all(JsonValue::is_object) => {
            parse_json_columns(columns)
        }
        _ => bail!("Expected a top-level JSON array of records or an object of columns"),
    }
}

fn parse_json_records(records: &[JsonValue]) -> Result<Vec<Article>> {
    if let Some(first) = records.first().and_then(|r| r.as_object()) {
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        check_columns(&keys)?;
    }

    let mut articles = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let article = Article::from_cells(i, |field| {
            obj.iter()
                .find(|(key, _)| field.matches(key))
                .map(|(_, val)| json_to_cell(val))
                .unwrap_or(CellValue::Null)
        })?;
        articles.push(article);
    }

    Ok(articles)
}

fn parse_json_columns(columns: &JsonMap<String, JsonValue>) -> Result<Vec<Article>> {
    let keys: Vec<&str> = columns.keys().map(String::as_str).collect();
    check_columns(&keys)?;

    // Row labels are the union of every column's keys. Integer labels
    // ("0", "1", ..., "10") sort numerically, anything else after them.
    let mut rows: Vec<&str> = columns
        .values()
        .filter_map(JsonValue::as_object)
        .flat_map(|column| column.keys().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    rows.sort_by_key(|key| (key.parse::<i64>().map_err(|_| ()), *key));

    let fields: Vec<(Field, Option<&JsonMap<String, JsonValue>>)> = Field::ALL
        .into_iter()
        .map(|f| {
            let column = columns
                .iter()
                .find(|(name, _)| f.matches(name))
                .and_then(|(_, col)| col.as_object());
            (f, column)
        })
        .collect();

    let mut articles = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let article = Article::from_cells(i, |field| {
            fields
                .iter()
                .find(|(f, _)| *f == field)
                .and_then(|(_, col)| *col)
                .and_then(|col| col.get(*row))
                .map(json_to_cell)
                .unwrap_or(CellValue::Null)
        })?;
        articles.push(article);
    }

    Ok(articles)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one article per record.
/// Empty cells are treated as missing values.
fn load_csv(path: &Path) -> Result<Vec<Article>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    parse_csv(reader)
}

fn parse_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Article>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    check_columns(&headers)?;

    let positions: Vec<(Field, Option<usize>)> = Field::ALL
        .into_iter()
        .map(|f| (f, f.position(&headers)))
        .collect();

    let mut articles = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let article = Article::from_cells(row_no, |field| {
            positions
                .iter()
                .find(|(f, _)| *f == field)
                .and_then(|(_, idx)| *idx)
                .and_then(|idx| record.get(idx))
                .map(guess_cell_type)
                .unwrap_or(CellValue::Null)
        })?;
        articles.push(article);
    }

    Ok(articles)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per article field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Article>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut articles = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        check_columns(&names)?;

        let columns: Vec<(Field, Option<&Arc<dyn Array>>)> = Field::ALL
            .into_iter()
            .map(|f| (f, f.position(&names).map(|idx| batch.column(idx))))
            .collect();

        for row in 0..batch.num_rows() {
            let row_no = articles.len();
            let mut failure = None;
            let article = Article::from_cells(row_no, |field| {
                let Some(col) = columns
                    .iter()
                    .find(|(f, _)| *f == field)
                    .and_then(|(_, col)| *col)
                else {
                    return CellValue::Null;
                };
                match extract_cell(col, row) {
                    Ok(cell) => cell,
                    Err(e) => {
                        failure.get_or_insert(e);
                        CellValue::Null
                    }
                }
            });
            if let Some(e) = failure {
                return Err(e.context(format!("Row {row_no}")));
            }
            articles.push(article?);
        }
    }

    Ok(articles)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => bail!("Unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const PT_JSON: &str = r#"[
        {"ID": 1, "Ano": 2020, "Classificação": "A", "Área de Avaliação": "Ensino",
         "Área Específica": "Física", "Fator de Impacto": 1.0, "Internacionalização": "Sim"},
        {"ID": 2, "Ano": 2021, "Classificação": "A", "Área de Avaliação": "Ensino",
         "Área Específica": "Física", "Fator de Impacto": null, "Internacionalização": "Não"},
        {"ID": 3, "Ano": 2021, "Classificação": "B", "Área de Avaliação": "Engenharias",
         "Área Específica": "Robótica", "Fator de Impacto": 3.0, "Internacionalização": "Sim"}
    ]"#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_portuguese_json_export() {
        let file = write_temp(".json", PT_JSON);
        let store = load_file(file.path()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.year_bounds, (2020, 2021));
        let a = &store.articles()[1];
        assert_eq!(a.id, "2");
        assert_eq!(a.evaluation_area, "Ensino");
        assert_eq!(a.impact_factor, None);
        assert_eq!(a.internationalized, "Não");
    }

    #[test]
    fn json_missing_column_names_the_field() {
        let articles = parse_json(r#"[{"id": 1, "year": 2020}]"#);
        let err = articles.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::MissingColumn(Field::Classification))
        );
    }

    #[test]
    fn loads_pandas_columns_layout_json() {
        let file = write_temp(
            ".json",
            r#"{
                "ID": {"0": 1, "1": 2, "10": 3, "2": 4},
                "Ano": {"0": 2020, "1": 2021, "10": 2022, "2": 2021},
                "Classificação": {"0": "A1", "1": "A2", "10": "B1", "2": "A1"},
                "Área de Avaliação": {"0": "Ensino", "1": "Ensino", "10": "Medicina", "2": "Ensino"},
                "Área Específica": {"0": "Física", "1": "Física", "10": "Cardiologia", "2": "Química"},
                "Fator de Impacto": {"0": 1.5, "1": null, "10": 2.0, "2": 0.5},
                "Internacionalização": {"0": "Sim", "1": "Não", "10": "Sim", "2": "Não"}
            }"#,
        );
        let store = load_file(file.path()).unwrap();

        assert_eq!(store.len(), 4);
        let ids: Vec<&str> = store.articles().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "4", "3"], "row labels sort numerically");
        let a = &store.articles()[1];
        assert_eq!(a.year, 2021);
        assert_eq!(a.impact_factor, None);
        assert_eq!(a.internationalized, "Não");
        assert_eq!(store.articles()[3].evaluation_area, "Medicina");
        assert_eq!(store.year_bounds, (2020, 2022));
    }

    #[test]
    fn json_columns_layout_missing_column_names_the_field() {
        let err = parse_json(r#"{"id": {"0": 1}, "year": {"0": 2020}}"#).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::MissingColumn(Field::Classification))
        );
    }

    #[test]
    fn json_rejects_non_array_root() {
        assert!(parse_json(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn loads_english_csv_with_empty_impact_cells() {
        let file = write_temp(
            ".csv",
            "id,year,classification,evaluation_area,specific_area,impact_factor,internationalized\n\
             a1,2019,A1,Ensino,Física,2.5,true\n\
             a2,2020,B2,Ensino,Química,,false\n",
        );
        let store = load_file(file.path()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.articles()[0].impact_factor, Some(2.5));
        assert_eq!(store.articles()[1].impact_factor, None);
        assert_eq!(store.articles()[1].internationalized, "false");
    }

    #[test]
    fn csv_booleans_match_regardless_of_case() {
        let reader = csv::Reader::from_reader(
            "id,year,classification,evaluation_area,specific_area,impact_factor,internationalized\n\
             1,2020,A1,Ensino,Física,1.0,True\n\
             2,2021,A1,Ensino,Física,1.0,FALSE\n"
                .as_bytes(),
        );
        let articles = parse_csv(reader).unwrap();
        assert_eq!(articles[0].internationalized, "true");
        assert_eq!(articles[1].internationalized, "false");
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
    }

    #[test]
    fn csv_without_impact_column_loads_all_undefined() {
        let reader = csv::Reader::from_reader(
            "ID,Ano,Classificação,Área de Avaliação,Área Específica,Internacionalização\n\
             1,2020,A1,Ensino,Física,Sim\n"
                .as_bytes(),
        );
        let articles = parse_csv(reader).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].impact_factor, None);
    }

    #[test]
    fn csv_duplicate_ids_fail_to_index() {
        let file = write_temp(
            ".csv",
            "id,year,classification,evaluation_area,specific_area,impact_factor,internationalized\n\
             7,2019,A1,Ensino,Física,2.5,true\n\
             7,2020,B2,Ensino,Química,1.0,false\n",
        );
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::DuplicateId("7".into()))
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }

    #[test]
    fn loads_parquet_with_nulls() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("ID", DataType::Int64, false),
            ArrowField::new("Ano", DataType::Int64, false),
            ArrowField::new("Classificação", DataType::Utf8, false),
            ArrowField::new("Área de Avaliação", DataType::Utf8, false),
            ArrowField::new("Área Específica", DataType::Utf8, false),
            ArrowField::new("Fator de Impacto", DataType::Float64, true),
            ArrowField::new("Internacionalização", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![10, 11])),
                Arc::new(Int64Array::from(vec![2022, 2023])),
                Arc::new(StringArray::from(vec!["A2", "B1"])),
                Arc::new(StringArray::from(vec!["Ensino", "Ensino"])),
                Arc::new(StringArray::from(vec!["Física", "Química"])),
                Arc::new(Float64Array::from(vec![Some(0.75), None])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let store = load_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.articles()[0].id, "10");
        assert_eq!(store.articles()[0].impact_factor, Some(0.75));
        assert_eq!(store.articles()[1].impact_factor, None);
        assert_eq!(store.articles()[1].internationalized, "false");
        assert_eq!(store.year_bounds, (2022, 2023));
    }
}
