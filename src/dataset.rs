use crate::MutterError;
use crate::value::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-column statistics produced by an upstream parser at upload time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<serde_json::Value>,
    #[serde(default)]
    pub null_count: usize,
    #[serde(default)]
    pub unique_count: usize,
    pub data_type: Option<String>,
}

/// Cached parse results attached to a stored dataset. When present the engine
/// takes column types and base statistics from here instead of recomputing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub data_types: IndexMap<String, String>,
    #[serde(default)]
    pub statistics: IndexMap<String, MetadataStatistics>,
    #[serde(default)]
    pub sample_values: IndexMap<String, Vec<serde_json::Value>>,
    #[serde(default)]
    pub sheet_names: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    file_name: String,
    file_type: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    Stored(StoredDataset),
    Records(Vec<serde_json::Map<String, serde_json::Value>>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDataset {
    file_name: Option<String>,
    file_type: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<serde_json::Map<String, serde_json::Value>>,
    metadata: Option<Metadata>,
}

impl Dataset {
    /// Rows shorter than `columns` are padded with nulls; longer rows are cut.
    pub fn new(
        file_name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        let file_name = file_name.into();
        let file_type = extension_of(&file_name).unwrap_or_else(|| "csv".to_string());
        Dataset {
            file_name,
            file_type,
            columns,
            rows,
            metadata: None,
        }
    }

    pub fn from_strings(
        file_name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| CellValue::parse(v)).collect())
            .collect();
        Dataset::new(file_name, headers, rows)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, MutterError> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        let rows: Vec<Vec<String>> = rdr
            .records()
            .map(|r| {
                let record = r?;
                Ok(record.iter().map(String::from).collect::<Vec<String>>())
            })
            .collect::<Result<Vec<_>, MutterError>>()?;
        Ok(Dataset::from_strings(file_name_of(path), headers, rows))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MutterError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)?;
        Dataset::from_json(&input, &file_name_of(path))
    }

    /// Accepts either a stored dataset document (`fileName`, `columns`, `data`,
    /// optional `metadata`) or a bare array of records. `fallback_name` is used
    /// when the document does not carry a file name.
    pub fn from_json(input: &str, fallback_name: &str) -> Result<Self, MutterError> {
        let document: DatasetDocument = serde_json::from_str(input)?;
        let stored = match document {
            DatasetDocument::Stored(stored) => stored,
            DatasetDocument::Records(data) => StoredDataset {
                file_name: None,
                file_type: None,
                columns: Vec::new(),
                data,
                metadata: None,
            },
        };

        let mut columns = stored.columns;
        if columns.is_empty() {
            for record in &stored.data {
                for key in record.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = stored
            .data
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).map_or(CellValue::Null, CellValue::from_json))
                    .collect()
            })
            .collect();

        let file_name = stored
            .file_name
            .unwrap_or_else(|| fallback_name.to_string());
        let mut dataset = Dataset::new(file_name, columns, rows);
        if let Some(file_type) = stored.file_type {
            dataset.file_type = file_type;
        }
        dataset.metadata = stored.metadata;
        Ok(dataset)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, col_idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[col_idx])
    }

    pub fn numeric_values(&self, col_idx: usize) -> Vec<f64> {
        self.column(col_idx).filter_map(CellValue::as_number).collect()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}
