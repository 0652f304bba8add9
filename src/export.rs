//! CSV and XLSX serialization of flattened person rows.
//!
//! Rows are the output of [`crate::identity::flatten`]; columns always follow
//! [`EXPORT_COLUMNS`], missing keys and nulls become empty cells.

use crate::errors::AppError;
use crate::identity::EXPORT_COLUMNS;
use chrono::{DateTime, TimeZone};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Worksheet name used in XLSX exports.
pub const SHEET_NAME: &str = "Dados Pessoais";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
            ExportFormat::Csv => CSV_CONTENT_TYPE,
        }
    }

    /// Serializes `rows` in this format.
    pub fn render(&self, rows: &[Map<String, Value>]) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Xlsx => to_xlsx(rows),
            ExportFormat::Csv => to_csv(rows),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Xlsx(XlsxError),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Csv(e) => write!(f, "CSV export failed: {}", e),
            ExportError::Xlsx(e) => write!(f, "Excel export failed: {}", e),
            ExportError::Io(e) => write!(f, "Could not write export file: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err)
    }
}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        ExportError::Xlsx(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Text form of a cell: strings unquoted, nulls empty.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders rows as CSV with a header row, prefixed by the UTF-8 BOM.
pub fn to_csv(rows: &[Map<String, Value>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(EXPORT_COLUMNS)?;

    for row in rows {
        writer.write_record(EXPORT_COLUMNS.iter().map(|col| cell_text(row.get(*col))))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Renders rows as a single-sheet XLSX workbook with a bold header row.
///
/// Numbers stay numeric; CPF, phone and CEP are strings so leading zeros survive.
pub fn to_xlsx(rows: &[Map<String, Value>]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
            match row.get(*name) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(number) => {
                        worksheet.write_number(row_num, col as u16, number)?;
                    }
                    None => {
                        worksheet.write_string(row_num, col as u16, n.to_string())?;
                    }
                },
                Some(value) => {
                    worksheet.write_string(row_num, col as u16, cell_text(Some(value)))?;
                }
            }
        }
    }

    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Timestamped file name, e.g. `dados_pessoais_20261019_143000.csv`.
pub fn timestamped_filename<Tz>(prefix: &str, format: ExportFormat, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "{}_{}.{}",
        prefix,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Writes an export into `dir` (created if missing) and returns the file path.
pub fn write_to_dir(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    tracing::info!("Export written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_row() -> Map<String, Value> {
        match json!({
            "Nome Completo": "Joao Silva",
            "CPF": "01234567890",
            "Data de Nascimento": "01/02/1990",
            "Email": "joao.silva@gmail.com",
            "Celular": "96123456789",
            "Endereço - CEP": null,
            "Endereço - Logradouro": null,
            "Endereço - Número": 42,
            "Endereço - Complemento": "APTO 12",
            "Endereço - Bairro": null,
            "Endereço - Cidade": null,
            "Endereço - Estado": null
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_csv_has_bom_header_and_rows() {
        let bytes = to_csv(&[sample_row()]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), EXPORT_COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "Joao Silva,01234567890,01/02/1990,joao.silva@gmail.com,96123456789,,,42,APTO 12,,,"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_empty_batch_still_has_header() {
        let bytes = to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_xlsx_is_a_zip_archive() {
        let bytes = to_xlsx(&[sample_row()]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_timestamped_filename() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 5).unwrap();
        assert_eq!(
            timestamped_filename("dados_pessoais", ExportFormat::Csv, &now),
            "dados_pessoais_20261019_143005.csv"
        );
        assert_eq!(
            timestamped_filename("dados_gerados", ExportFormat::Xlsx, &now),
            "dados_gerados_20261019_143005.xlsx"
        );
    }

    #[test]
    fn test_write_to_dir_creates_directory() {
        let dir = std::env::temp_dir().join(format!("gerador-export-{}", std::process::id()));
        let path = write_to_dir(&dir, "teste.csv", b"a,b\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
