use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single decoded cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value decoded from a columnar payload.
///
/// The decoder cannot guarantee type constancy within a column, so cells
/// are a closed variant rather than a concrete scalar. Serializes as the
/// underlying JSON scalar (`Null` → `null`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Interpret the value as an `f64`; integers widen, nothing else coerces.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record / Table – row-major projection of one decode
// ---------------------------------------------------------------------------

/// One logical row: field name → decoded value.
pub type Record = BTreeMap<String, CellValue>;

/// A fully decoded table: records in source row order plus the shared field
/// set. Every record of one decode carries the same fields. A `Table` is
/// produced fresh per decode and replaced wholesale on reload, never
/// mutated in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    /// Field names in column order (schema names, or positional fallbacks).
    pub field_names: Vec<String>,
    /// All rows, in source order.
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(field_names: Vec<String>, records: Vec<Record>) -> Self {
        Table {
            field_names,
            records,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Best-effort conversion to domain records. Rows where the territory,
    /// year, or rate field fails to resolve are skipped rather than failing
    /// the whole table.
    pub fn indicators(&self) -> Vec<IndicatorRecord> {
        let converted: Vec<IndicatorRecord> = self
            .records
            .iter()
            .filter_map(IndicatorRecord::from_record)
            .collect();
        let skipped = self.records.len() - converted.len();
        if skipped > 0 {
            log::debug!("{skipped} of {} rows did not resolve to indicator records", self.records.len());
        }
        converted
    }
}

// ---------------------------------------------------------------------------
// IndicatorRecord – one territory/year observation
// ---------------------------------------------------------------------------

/// One indicator observation: a rate for a territory in a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub territory: String,
    pub year: i64,
    pub rate: f64,
}

// The published datasets carry Spanish column headers; synthesized or
// English names are accepted too. Matching is ASCII-case-insensitive.
const TERRITORY_FIELDS: &[&str] = &["territory", "departamento"];
const YEAR_FIELDS: &[&str] = &["year", "año", "ano"];
const RATE_FIELDS: &[&str] = &["rate", "tasa"];

impl IndicatorRecord {
    /// Resolve the three domain fields from a generic record by name.
    /// Returns `None` when any of them is missing or has an unusable type.
    pub fn from_record(record: &Record) -> Option<Self> {
        let territory = lookup(record, TERRITORY_FIELDS)?.as_str()?.to_string();
        let year = match lookup(record, YEAR_FIELDS)? {
            CellValue::Integer(y) => *y,
            // Year columns written through floating-point frames still count.
            CellValue::Float(y) if y.fract() == 0.0 => *y as i64,
            _ => return None,
        };
        let rate = lookup(record, RATE_FIELDS)?.as_f64()?;
        Some(IndicatorRecord {
            territory,
            year,
            rate,
        })
    }
}

fn lookup<'a>(record: &'a Record, aliases: &[&str]) -> Option<&'a CellValue> {
    record
        .iter()
        .find(|(name, _)| aliases.iter().any(|alias| name.eq_ignore_ascii_case(alias)))
        .map(|(_, value)| value)
}

// ---------------------------------------------------------------------------
