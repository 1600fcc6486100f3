use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::model::{CellValue, Record, Table};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Why a load attempt failed.
///
/// An empty payload is not a failure: zero columns or zero rows decode to
/// an empty [`Table`], so consumers can tell "no data" from "failed to
/// load".
#[derive(Debug, Error)]
pub enum LoadError {
    /// The endpoint answered with a non-success status. Checked before any
    /// decode attempt so an error page never reaches the parquet reader.
    #[error("transport error: status {status}")]
    Transport { status: StatusCode },

    /// The request itself failed (connection, TLS, body read).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload is not a decodable parquet container.
    #[error("decode error: {0}")]
    Decode(#[from] parquet::errors::ParquetError),

    /// A decoded batch could not be materialized as Arrow arrays.
    #[error("decode error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// GET the payload behind `locator`, failing on any non-success status
/// before the body is read.
pub async fn fetch_bytes(client: &Client, locator: &str) -> Result<Bytes, LoadError> {
    let response = client.get(locator).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Transport { status });
    }
    Ok(response.bytes().await?)
}

/// Fetch and decode in one step.
pub async fn fetch_table(client: &Client, locator: &str) -> Result<Table, LoadError> {
    let bytes = fetch_bytes(client, locator).await?;
    decode_table(bytes)
}

/// Schema-aware variant of [`fetch_table`].
pub async fn fetch_table_with_schema(
    client: &Client,
    locator: &str,
) -> Result<(Table, SchemaRef), LoadError> {
    let bytes = fetch_bytes(client, locator).await?;
    decode_table_with_schema(bytes)
}

// ---------------------------------------------------------------------------
// Decode + transposition
// ---------------------------------------------------------------------------

/// Decode a parquet payload into a row-major [`Table`].
pub fn decode_table(bytes: Bytes) -> Result<Table, LoadError> {
    decode_table_with_schema(bytes).map(|(table, _)| table)
}

/// Decode a parquet payload, also exposing the embedded Arrow schema so
/// callers can inspect the logical column types.
pub fn decode_table_with_schema(bytes: Bytes) -> Result<(Table, SchemaRef), LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let field_names: Vec<String> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(col_idx, field)| resolve_field_name(Some(field.name()), col_idx))
        .collect();

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        debug!(
            "decoded batch: {} rows x {} columns",
            batch.num_rows(),
            batch.num_columns()
        );
        transpose_into(&mut records, batch.columns(), &field_names);
    }

    Ok((Table::new(field_names, records), schema))
}

/// Schema name when present and non-empty, else a positional fallback.
fn resolve_field_name(schema_name: Option<&str>, col_idx: usize) -> String {
    match schema_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("column_{col_idx}"),
    }
}

/// Column-major → row-major projection.
///
/// The row count follows the first column. A shorter column contributes
/// [`CellValue::Null`] for its missing cells and a longer one is truncated
/// at the row count, so malformed column lengths never index out of range.
fn transpose_into(records: &mut Vec<Record>, columns: &[ArrayRef], field_names: &[String]) {
    let num_rows = columns.first().map(|c| c.len()).unwrap_or(0);
    records.reserve(num_rows);

    for row in 0..num_rows {
        let mut record = Record::new();
        for (col_idx, column) in columns.iter().enumerate() {
            let value = if row < column.len() {
                cell_value(column, row)
            } else {
                CellValue::Null
            };
            let name = match field_names.get(col_idx) {
                Some(name) => name.clone(),
                None => resolve_field_name(None, col_idx),
            };
            record.insert(name, value);
        }
        records.push(record);
    }
}

/// Extract one cell as a [`CellValue`].
///
/// Column types outside the native set degrade to their string rendering
/// rather than failing the decode.
fn cell_value(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().unwrap();
            CellValue::String(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            CellValue::String(arr.value(row).to_string())
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => match array_value_to_string(col, row) {
            Ok(rendered) => CellValue::String(rendered),
            Err(_) => CellValue::Null,
        },
    }
}

// ---------------------------------------------------------------------------
// Observable load state
// ---------------------------------------------------------------------------

/// Tri-state outcome of one load attempt. Exactly one terminal state is
/// reached per attempt; re-triggering a load starts a fresh `Pending`.
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready(Table),
    Failed(LoadError),
}

impl LoadState {
    /// Decoded records; empty unless the load is `Ready`.
    pub fn records(&self) -> &[Record] {
        match self {
            LoadState::Ready(table) => &table.records,
            _ => &[],
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            LoadState::Ready(table) => Some(table),
            _ => None,
        }
    }

    pub fn loading(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Tag for one load attempt. Commits from superseded attempts are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Owns the observable `{data, loading, error}` state for one consumer.
///
/// Every attempt is tagged with a generation counter: [`TableLoader::begin`]
/// supersedes whatever is in flight, and [`TableLoader::commit`] ignores
/// results from superseded generations, so a stale response can never
/// overwrite fresher state.
pub struct TableLoader {
    client: Client,
    generation: u64,
    state: LoadState,
    schema: Option<SchemaRef>,
}

impl Default for TableLoader {
    fn default() -> Self {
        TableLoader::new(Client::new())
    }
}

impl TableLoader {
    pub fn new(client: Client) -> Self {
        TableLoader {
            client,
            generation: 0,
            state: LoadState::Pending,
            schema: None,
        }
    }

    /// Start a new load attempt, superseding any in-flight one.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Pending;
        self.schema = None;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a load attempt. Returns `false` when the ticket
    /// was superseded and the result discarded.
    pub fn commit(&mut self, ticket: LoadTicket, result: Result<Table, LoadError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "discarding superseded load result (generation {} behind {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(table) => LoadState::Ready(table),
            Err(err) => LoadState::Failed(err),
        };
        true
    }

    /// One-shot load: begin → fetch → decode → commit. The pending flag
    /// clears on every exit path, success, empty, or failure alike.
    pub async fn load(&mut self, locator: &str) -> &LoadState {
        let ticket = self.begin();
        let result = fetch_table(&self.client, locator).await;
        self.commit(ticket, result);
        &self.state
    }

    /// Schema-aware one-shot load; the decoded schema is kept alongside
    /// the table.
    pub async fn load_with_schema(&mut self, locator: &str) -> &LoadState {
        let ticket = self.begin();
        match fetch_table_with_schema(&self.client, locator).await {
            Ok((table, schema)) => {
                if self.commit(ticket, Ok(table)) {
                    self.schema = Some(schema);
                }
            }
            Err(err) => {
                self.commit(ticket, Err(err));
            }
        }
        &self.state
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        self.state.records()
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.state.error()
    }

    /// Decoded schema of the latest schema-aware load, if any.
    pub fn schema(&self) -> Option<&SchemaRef> {
        self.schema.as_ref()
    }
}

// ---------------------------------------------------------------------------
