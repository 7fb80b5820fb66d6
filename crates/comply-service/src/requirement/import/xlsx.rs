//! First-sheet reader for `.xlsx` workbooks.
//!
//! Reads `xl/sharedStrings.xml` and `xl/worksheets/sheet1.xml` straight
//! from the archive. Cell references place values by column letter and
//! gaps inside a row are padded with empty strings.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use comply_core::error::AppError;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const FIRST_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Failure to read a workbook.
#[derive(Debug, Error)]
pub enum XlsxError {
    /// The upload is not a readable ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] ZipError),

    /// A part could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl From<XlsxError> for AppError {
    fn from(err: XlsxError) -> Self {
        AppError::validation(format!("The workbook could not be read: {err}"))
    }
}

/// Rows of the first worksheet as strings.
///
/// A workbook without a first sheet yields no rows.
pub fn parse_xlsx(bytes: &[u8]) -> Result<Vec<Vec<String>>, XlsxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let shared = match read_part(&mut archive, SHARED_STRINGS)? {
        Some(xml) => shared_strings(&xml)?,
        None => Vec::new(),
    };
    match read_part(&mut archive, FIRST_SHEET)? {
        Some(xml) => sheet_rows(&xml, &shared),
        None => Ok(Vec::new()),
    }
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, XlsxError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Text of every `<si>` entry; rich-text runs are concatenated.
fn shared_strings(xml: &str) -> Result<Vec<String>, XlsxError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => strings.extend(current.take()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// Cell being read inside `<c>`.
#[derive(Debug, Default)]
struct CellState {
    column: usize,
    shared: bool,
    value: String,
}

fn sheet_rows(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, XlsxError> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: BTreeMap<usize, String> = BTreeMap::new();
    let mut cell: Option<CellState> = None;
    let mut in_value = false;
    let mut next_column = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row.clear();
                    next_column = 0;
                }
                b"c" => {
                    let state = cell_state(&e, next_column)?;
                    next_column = state.column + 1;
                    cell = Some(state);
                }
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                next_column = cell_state(&e, next_column)?.column + 1;
            }
            Event::Text(t) if in_value => {
                if let Some(state) = cell.as_mut() {
                    state.value.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(state) = cell.take() {
                        let value = if state.shared {
                            state
                                .value
                                .trim()
                                .parse::<usize>()
                                .ok()
                                .and_then(|i| shared.get(i).cloned())
                                .unwrap_or_default()
                        } else {
                            state.value
                        };
                        row.insert(state.column, value);
                    }
                }
                b"row" => {
                    if let Some(&last) = row.keys().next_back() {
                        let padded = (0..=last)
                            .map(|i| row.remove(&i).unwrap_or_default())
                            .collect();
                        rows.push(padded);
                    }
                    row.clear();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rows)
}

fn cell_state(element: &BytesStart<'_>, fallback_column: usize) -> Result<CellState, XlsxError> {
    let mut state = CellState {
        column: fallback_column,
        ..CellState::default()
    };
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.as_ref() {
            b"r" => {
                if let Some(column) = column_index(&attr.unescape_value()?) {
                    state.column = column;
                }
            }
            b"t" => state.shared = attr.value.as_ref() == b"s",
            _ => {}
        }
    }
    Ok(state)
}

/// Zero-based column of a cell reference such as `AB12`.
pub fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let index = letters
        .iter()
        .fold(0usize, |acc, b| acc * 26 + usize::from(b - b'A' + 1));
    Some(index - 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Build a workbook with the given shared strings and sheet XML.
    pub(crate) fn workbook(shared: &[&str], sheet_data: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let items: String = shared
            .iter()
            .map(|s| format!("<si><t>{s}</t></si>"))
            .collect();
        zip.start_file(SHARED_STRINGS, options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{items}</sst>"#,
            shared.len()
        )
        .unwrap();

        zip.start_file(FIRST_SHEET, options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
        )
        .unwrap();

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn test_reads_shared_and_inline_values() {
        let bytes = workbook(
            &["Agency", "Deadline", "BIR"],
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
               <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>46100</v></c></row>"#,
        );
        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(rows, vec![vec!["Agency", "Deadline"], vec!["BIR", "46100"]]);
    }

    #[test]
    fn test_pads_gaps_between_cells() {
        let bytes = workbook(
            &["x", "y"],
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="s"><v>1</v></c></row>
               <row r="2"><c r="A2" t="inlineStr"><is><t>Cruz &amp; Co</t></is></c></row>"#,
        );
        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(rows[0], vec!["x", "", "y"]);
        assert_eq!(rows[1], vec!["Cruz & Co"]);
    }

    #[test]
    fn test_rejects_non_zip() {
        let err = parse_xlsx(b"agency,category\n").unwrap_err();
        assert!(matches!(err, XlsxError::Zip(_)));
    }
}
