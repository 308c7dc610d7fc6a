use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::ConfigurationError;
use crate::model::AttributeValue;

/// Inferred type of a whole CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ColumnKind {
    /// Narrowest type every non-empty cell parses as
    fn infer(cells: &[&str]) -> Self {
        let present: Vec<&str> = cells.iter().copied().filter(|c| !c.is_empty()).collect();
        if present.is_empty() {
            return ColumnKind::Str;
        }
        if present.iter().all(|c| c.parse::<i64>().is_ok()) {
            ColumnKind::Int
        } else if present.iter().all(|c| c.parse::<f64>().is_ok()) {
            ColumnKind::Float
        } else if present
            .iter()
            .all(|c| c.eq_ignore_ascii_case("true") || c.eq_ignore_ascii_case("false"))
        {
            ColumnKind::Bool
        } else {
            ColumnKind::Str
        }
    }

    fn convert(self, cell: &str) -> AttributeValue {
        if cell.is_empty() {
            return AttributeValue::Null;
        }
        match self {
            ColumnKind::Int => cell
                .parse()
                .map(AttributeValue::Int)
                .unwrap_or(AttributeValue::Null),
            ColumnKind::Float => cell
                .parse()
                .map(AttributeValue::Float)
                .unwrap_or(AttributeValue::Null),
            ColumnKind::Bool => AttributeValue::Bool(cell.eq_ignore_ascii_case("true")),
            ColumnKind::Str => AttributeValue::String(cell.to_string()),
        }
    }
}

/// Tabular condition dataset with typed cells
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTable {
    columns: Vec<String>,
    rows: Vec<Vec<AttributeValue>>,
}

impl ConditionTable {
    /// Build a table from headers and typed rows
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<AttributeValue>>,
    ) -> Result<Self, ConfigurationError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ConfigurationError::MalformedConditionTable(format!(
                "row {index} has {} values but {} columns are declared",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Load a comma separated table from disk
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let failed = |reason: String| ConfigurationError::ConditionTable {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| failed(e.to_string()))?;
        Self::from_reader(BufReader::new(file)).map_err(|e| failed(e.to_string()))
    }

    /// Parse a comma separated table.
    ///
    /// Each column gets a single type: integer, float, boolean or string, in
    /// that order of preference. Empty cells are null.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut raw_rows = Vec::new();
        for record in csv_reader.records() {
            raw_rows.push(record?);
        }

        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|i| {
                let cells: Vec<&str> = raw_rows.iter().map(|r| r.get(i).unwrap_or("")).collect();
                ColumnKind::infer(&cells)
            })
            .collect();

        let rows = raw_rows
            .iter()
            .map(|record| {
                kinds
                    .iter()
                    .enumerate()
                    .map(|(i, kind)| kind.convert(record.get(i).unwrap_or("")))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Column headers in declared order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Typed rows
    pub fn rows(&self) -> &[Vec<AttributeValue>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column whose lower-cased header equals `name`
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.find_any_column(&[name])
    }

    /// First column, in declared order, whose lower-cased header is one of `names`
    pub fn find_any_column(&self, names: &[&str]) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| names.contains(&c.to_lowercase().as_str()))
    }
}
