//! Raw grid acquisition with encoding and delimiter auto-detection.
//!
//! Reads CSV (file, bytes or string) and JSON exports into a [`Grid`] of
//! ordered key/value records. No model-specific logic here.

use crate::error::{GridError, GridResult};
use serde_json::Value;
use std::path::Path;

// =============================================================================
// Grid and Record
// =============================================================================

/// One raw grid row: ordered column-key / raw-value pairs.
///
/// Keys are either the header strings of the source file or generated
/// column letters (`A`, `B`, ... `AA`), depending on [`KeyMode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Raw value under `key`, first match wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A whole raw sheet: records in source order.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub records: Vec<Record>,
}

impl Grid {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Build a grid from borrowed pairs. Handy in tests and examples.
    pub fn from_pairs(rows: Vec<Vec<(&str, &str)>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                Record::from_pairs(
                    row.into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How CSV records get their column keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// First line is a header row; its fields become the keys.
    #[default]
    HeaderRow,
    /// Every line is data; keys are generated letters `A`, `B`, ... `AA`.
    ColumnLetters,
}

/// Result of reading a CSV source, with detection metadata.
#[derive(Debug, Clone)]
pub struct CsvGrid {
    /// The records, keyed per the requested [`KeyMode`].
    pub grid: Grid,
    /// Detected or used encoding.
    pub encoding: String,
    /// Detected or used delimiter.
    pub delimiter: char,
    /// The column keys, in sheet order.
    pub headers: Vec<String>,
}

/// Spreadsheet-style letter for a zero-based column index.
///
/// `0` is `A`, `25` is `Z`, `26` is `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

// =============================================================================
// Encoding and Delimiter Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> GridResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: try UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// CSV Reading
// =============================================================================

/// Read a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = sheetload::read_csv_file("export.csv", KeyMode::HeaderRow)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.grid.len());
/// ```
pub fn read_csv_file<P: AsRef<Path>>(path: P, keys: KeyMode) -> GridResult<CsvGrid> {
    let bytes = std::fs::read(path.as_ref())?;
    read_csv_bytes(&bytes, keys)
}

/// Read CSV bytes with auto-detection of encoding and delimiter.
pub fn read_csv_bytes(bytes: &[u8], keys: KeyMode) -> GridResult<CsvGrid> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    read_csv_str(&content, delimiter, keys, encoding)
}

/// Read a CSV string with an explicit delimiter and return metadata.
pub fn read_csv_str(
    content: &str,
    delimiter: char,
    keys: KeyMode,
    encoding: String,
) -> GridResult<CsvGrid> {
    let rows = tokenize(content, delimiter)?;

    let (headers, data) = match keys {
        KeyMode::HeaderRow => {
            let mut iter = rows.into_iter();
            let headers = iter.next().unwrap_or_default();
            (headers, iter.collect::<Vec<_>>())
        }
        KeyMode::ColumnLetters => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let headers = (0..width).map(column_letter).collect();
            (headers, rows)
        }
    };

    let records = data
        .into_iter()
        .map(|fields| {
            let mut record = Record::new();
            for (i, key) in headers.iter().enumerate() {
                // Short rows are padded, extra fields are dropped
                let value = fields.get(i).map(String::as_str).unwrap_or("");
                record.push(key.clone(), value);
            }
            record
        })
        .collect();

    Ok(CsvGrid {
        grid: Grid::new(records),
        encoding,
        delimiter,
        headers,
    })
}

fn tokenize(content: &str, delimiter: char) -> GridResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.iter().all(String::is_empty) {
            continue;
        }
        rows.push(fields);
    }

    if rows.is_empty() {
        return Err(GridError::EmptyGrid);
    }
    Ok(rows)
}

// =============================================================================
// JSON Reading
// =============================================================================

/// Read a JSON export (an array of flat objects) into a grid.
///
/// Scalar values are stringified the way a spreadsheet export would show
/// them; nested arrays or objects are rejected.
pub fn grid_from_json(text: &str) -> GridResult<Grid> {
    let value: Value = serde_json::from_str(text)?;
    let items = value
        .as_array()
        .ok_or_else(|| GridError::ShapeError("JSON grid must be an array of objects".into()))?;

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            GridError::ShapeError(format!("Record {} is not an object", i + 1))
        })?;

        let mut record = Record::new();
        for (key, value) in object {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "true".to_string(),
                Value::Bool(false) => "false".to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(GridError::ShapeError(format!(
                        "Record {}: value of '{}' is not a scalar",
                        i + 1,
                        key
                    )))
                }
            };
            record.push(key.clone(), raw);
        }
        records.push(record);
    }

    Ok(Grid::new(records))
}

// =============================================================================
// CSV Writing
// =============================================================================

/// Serialize records to CSV. The first record's keys form the header row.
pub fn write_csv(records: &[Record], delimiter: char) -> GridResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());

    if let Some(first) = records.first() {
        let keys: Vec<&str> = first.keys().collect();
        writer.write_record(&keys)?;
        for record in records {
            let fields: Vec<&str> = keys
                .iter()
                .map(|key| record.get(key).unwrap_or(""))
                .collect();
            writer.write_record(&fields)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GridError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| GridError::EncodingError(e.to_string()))
}

/// Serialize records to a CSV file.
pub fn write_csv_file<P: AsRef<Path>>(
    path: P,
    records: &[Record],
    delimiter: char,
) -> GridResult<()> {
    let content = write_csv(records, delimiter)?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "name;age\nAlice;30\nBob;25";
        let result = read_csv_str(csv, ';', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        assert_eq!(result.grid.len(), 2);
        assert_eq!(result.grid.records[0].get("name"), Some("Alice"));
        assert_eq!(result.grid.records[0].get("age"), Some("30"));
        assert_eq!(result.grid.records[1].get("name"), Some("Bob"));
        assert_eq!(result.grid.records[1].get("age"), Some("25"));
    }

    #[test]
    fn test_technical_keys() {
        let csv = "Alice;30\nBob;25";
        let result = read_csv_str(csv, ';', KeyMode::ColumnLetters, "utf-8".into()).unwrap();

        assert_eq!(result.headers, vec!["A", "B"]);
        assert_eq!(result.grid.len(), 2);
        assert_eq!(result.grid.records[0].get("A"), Some("Alice"));
        assert_eq!(result.grid.records[1].get("B"), Some("25"));
    }

    #[test]
    fn test_comma_delimiter() {
        let csv = "a,b,c\n1,2,3";
        let result = read_csv_str(csv, ',', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        let record = &result.grid.records[0];
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("b"), Some("2"));
        assert_eq!(record.get("c"), Some("3"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name;value\n\"Alice\";\"Hello; World\"";
        let result = read_csv_str(csv, ';', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        let record = &result.grid.records[0];
        assert_eq!(record.get("name"), Some("Alice"));
        assert_eq!(record.get("value"), Some("Hello; World"));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a;b\n1;2\n\n3;4\n";
        let result = read_csv_str(csv, ';', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        assert_eq!(result.grid.len(), 2);
    }

    #[test]
    fn test_missing_values_padded() {
        let csv = "a;b;c\n1;;3\n1";
        let result = read_csv_str(csv, ';', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        assert_eq!(result.grid.records[0].get("b"), Some(""));
        assert_eq!(result.grid.records[1].get("b"), Some(""));
        assert_eq!(result.grid.records[1].get("c"), Some(""));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "a;b\n1;2;3;4";
        let result = read_csv_str(csv, ';', KeyMode::HeaderRow, "utf-8".into()).unwrap();

        let record = &result.grid.records[0];
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("b"), Some("2"));
    }

    #[test]
    fn test_empty_csv_error() {
        let result = read_csv_str("", ';', KeyMode::HeaderRow, "utf-8".into());
        assert!(matches!(result, Err(GridError::EmptyGrid)));
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "name;age\nAlice;30\nBob;25";
        let result = read_csv_bytes(csv.as_bytes(), KeyMode::HeaderRow).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.grid.len(), 2);
        assert_eq!(result.headers, vec!["name", "age"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_read_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "id,name\n1,Alice\n2,Bob").unwrap();

        let result = read_csv_file(&path, KeyMode::HeaderRow).unwrap();
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.grid.len(), 2);
        assert_eq!(result.grid.records[1].get("name"), Some("Bob"));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(52), "BA");
    }

    #[test]
    fn test_json_grid() {
        let text = r#"[{"A": "Alice", "B": 30, "C": true, "D": null}]"#;
        let grid = grid_from_json(text).unwrap();

        let record = &grid.records[0];
        assert_eq!(record.get("A"), Some("Alice"));
        assert_eq!(record.get("B"), Some("30"));
        assert_eq!(record.get("C"), Some("true"));
        assert_eq!(record.get("D"), Some(""));
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_json_grid_rejects_non_objects() {
        assert!(grid_from_json(r#"["Alice", "Bob"]"#).is_err());
        assert!(grid_from_json(r#"{"A": "Alice"}"#).is_err());
        assert!(grid_from_json(r#"[{"A": {"nested": 1}}]"#).is_err());
    }

    #[test]
    fn test_write_csv() {
        let records = vec![
            Record::from_pairs(vec![
                ("A".into(), "Alice".into()),
                ("B".into(), "30".into()),
            ]),
            Record::from_pairs(vec![("A".into(), "Bob".into()), ("B".into(), "25".into())]),
        ];

        let out = write_csv(&records, ';').unwrap();
        assert_eq!(out, "A;B\nAlice;30\nBob;25\n");
    }
}
