//! Single-row CSV export.

use mgadl_core::columns;
use mgadl_core::models::cell::CellValue;
use mgadl_core::models::record::Record;

/// Byte-order mark so spreadsheet apps open the file as UTF-8.
const UTF8_BOM: char = '\u{feff}';

/// Render `record` as a two-line CSV (header + data) in expected-column
/// order, prefixed with a UTF-8 BOM.
pub fn record_csv(record: &Record) -> String {
    let header = columns::expected_header();
    let row = record.row_for_header(&header);

    let mut out = String::new();
    out.push(UTF8_BOM);
    push_line(&mut out, header.iter().map(String::as_str));
    let cells: Vec<String> = row.iter().map(CellValue::to_string).collect();
    push_line(&mut out, cells.iter().map(String::as_str));
    out
}

/// `mgadl_{patient_hash}_{YYYYMMDD_HHMMSS}.csv`
pub fn file_name(record: &Record, now: jiff::civil::DateTime) -> String {
    format!(
        "mgadl_{}_{}.csv",
        record.patient_hash,
        now.strftime("%Y%m%d_%H%M%S")
    )
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let escaped: Vec<String> = fields.map(escape).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
