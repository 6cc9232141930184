//! Uploaded file parsing
//!
//! Turns a CSV or spreadsheet upload into a [`SheetTable`]: one trimmed
//! header row plus data rows padded to the header width.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{ImportError, ImportResult};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parsed upload: header row plus data rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `count` data rows
    pub fn preview(&self, count: usize) -> &[Vec<String>] {
        &self.rows[..count.min(self.rows.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Workbook,
}

impl FileFormat {
    /// Pick a format from the file extension, falling back to magic bytes
    pub fn detect(file_name: &str, bytes: &[u8]) -> ImportResult<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("txt") => Ok(FileFormat::Csv),
            Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => Ok(FileFormat::Workbook),
            Some("pdf") | Some("doc") | Some("docx") | Some("json") => {
                Err(ImportError::UnsupportedFormat(file_name.to_string()))
            }
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => Ok(FileFormat::Workbook),
            _ => Ok(FileFormat::Csv),
        }
    }
}

/// Parse an uploaded file into a table
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> ImportResult<SheetTable> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let records = match FileFormat::detect(file_name, bytes)? {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Workbook => read_workbook(bytes)?,
    };

    build_table(records)
}

fn read_csv(bytes: &[u8]) -> ImportResult<Vec<Vec<String>>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(|e| ImportError::Parse(e.to_string()))
        })
        .collect()
}

fn read_workbook(bytes: &[u8]) -> ImportResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::EmptyFile)?
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Whole numbers lose the trailing `.0` so numeric phone cells survive
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn build_table(records: Vec<Vec<String>>) -> ImportResult<SheetTable> {
    let mut records = records.into_iter().skip_while(|row| is_blank(row));

    let headers: Vec<String> = records
        .next()
        .ok_or(ImportError::EmptyFile)?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let width = headers.len();
    let rows = records
        .filter(|row| !is_blank(row))
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();

    Ok(SheetTable { headers, rows })
}
